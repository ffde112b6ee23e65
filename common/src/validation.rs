use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::product::ProductId;

/// A client-side precondition that failed before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pickup time {pickup_time} must be after {now}")]
    PickupNotInFuture {
        pickup_time: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    #[error("a message for the product owner is required")]
    EmptyMessage,
    #[error("choose a score between 1 and 5")]
    MissingScore,
    #[error("score {0} is outside 1..=5")]
    ScoreOutOfRange(u8),
    #[error("a comment is required")]
    EmptyComment,
    #[error("no delivered reservation of product {product_id} found; only delivered pickups can be rated")]
    NoEligibleReservation { product_id: ProductId },
}

/// Check a new reservation against the clock before it is sent.
///
/// The pickup time must be strictly after `now`; equal instants are rejected.
pub fn validate_new_reservation(
    pickup_time: DateTime<Utc>,
    message: &str,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if pickup_time <= now {
        return Err(ValidationError::PickupNotInFuture { pickup_time, now });
    }
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(())
}
