use remeal_common::rating::{Rating, RatingInvitation, Score};
use remeal_common::reservation::{Reservation, ReservationId, ReservationState};
use remeal_common::validation::ValidationError;
use remeal_common::wire::CreateRatingRequest;

use crate::api::ReservationApi;
use crate::error::ReservationError;

pub const RATING_SENT: &str = "Thanks for rating this pickup";

/// Outcome of the last submission. Success and failure share one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

/// Rating form for a delivered reservation.
///
/// Eligibility is decided once, when the prompt opens, from a fresh copy of
/// the user's reservations rather than from whatever the caller believes.
pub struct RatingPrompt<'a, A> {
    api: &'a A,
    invitation: RatingInvitation,
    eligible: Option<ReservationId>,
    score: Option<u8>,
    comment: String,
    feedback: Option<Feedback>,
}

impl<'a, A: ReservationApi> RatingPrompt<'a, A> {
    pub async fn open(api: &'a A, invitation: RatingInvitation) -> Result<Self, ReservationError> {
        let mine = api.my_reservations().await?;
        let eligible = mine
            .iter()
            .find(|r| is_eligible(r, &invitation))
            .map(|r| r.id.clone());
        if eligible.is_none() {
            tracing::info!(
                "No delivered reservation of product {} to rate",
                invitation.product_id
            );
        }
        Ok(Self {
            api,
            invitation,
            eligible,
            score: None,
            comment: String::new(),
            feedback: None,
        })
    }

    pub fn invitation(&self) -> &RatingInvitation {
        &self.invitation
    }

    pub fn is_blocked(&self) -> bool {
        self.eligible.is_none()
    }

    /// Shown in place of the form when there is nothing to rate.
    pub fn blocked_reason(&self) -> Option<String> {
        self.is_blocked().then(|| {
            format!(
                "You can only rate product {} after picking up a reservation of it",
                self.invitation.product_id
            )
        })
    }

    pub fn set_score(&mut self, score: u8) {
        self.score = Some(score);
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn score(&self) -> Option<u8> {
        self.score
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub async fn submit(&mut self) -> Result<Rating, ReservationError> {
        let request = match self.request() {
            Ok(request) => request,
            Err(e) => {
                self.feedback = Some(Feedback::Error(e.to_string()));
                return Err(e.into());
            }
        };

        match self.api.create_rating(&request).await {
            Ok(rating) => {
                tracing::info!(
                    "Rated reservation {} with {}",
                    rating.reservation_id,
                    rating.score
                );
                self.score = None;
                self.comment.clear();
                self.feedback = Some(Feedback::Success(RATING_SENT.to_string()));
                Ok(rating)
            }
            Err(e) => {
                tracing::warn!("Sending rating failed: {}", e);
                self.feedback = Some(Feedback::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn request(&self) -> Result<CreateRatingRequest, ValidationError> {
        let reservation_id = self
            .eligible
            .clone()
            .ok_or_else(|| ValidationError::NoEligibleReservation {
                product_id: self.invitation.product_id.clone(),
            })?;
        let score = Score::try_from(self.score.ok_or(ValidationError::MissingScore)?)?;
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(CreateRatingRequest {
            comentario: comment.to_string(),
            puntuacion: score,
            id_producto: self.invitation.product_id.clone(),
            id_reserva: reservation_id,
        })
    }
}

fn is_eligible(reservation: &Reservation, invitation: &RatingInvitation) -> bool {
    reservation.product_id == invitation.product_id
        && reservation.state == ReservationState::Delivered
        && invitation
            .reservation_id
            .as_ref()
            .map_or(true, |id| *id == reservation.id)
}
