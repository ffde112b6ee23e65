use std::fmt;

use serde::{Deserialize, Serialize};

use crate::product::ProductId;
use crate::reservation::ReservationId;
use crate::validation::ValidationError;

/// Unique rating identifier, assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingId(#[serde(deserialize_with = "crate::identity::opaque_id")] pub String);

impl fmt::Display for RatingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 1–5 star score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Score(value))
        } else {
            Err(ValidationError::ScoreOutOfRange(value))
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// A rating left after a delivered pickup. Each rating belongs to exactly one
/// reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    #[serde(rename = "id_reserva")]
    pub reservation_id: ReservationId,
    #[serde(rename = "id_producto")]
    pub product_id: ProductId,
    #[serde(rename = "puntuacion")]
    pub score: Score,
    #[serde(rename = "comentario", default)]
    pub comment: String,
}

/// The (product, reservation) pair a rating prompt is opened for.
///
/// `reservation_id` is `None` when the caller only knows the product; the
/// prompt then looks up the reservation itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingInvitation {
    pub product_id: ProductId,
    pub reservation_id: Option<ReservationId>,
}
