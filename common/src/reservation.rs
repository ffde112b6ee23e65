use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Role, UserId};
use crate::product::ProductId;
use crate::wire;

/// Unique reservation identifier, assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(#[serde(deserialize_with = "crate::identity::opaque_id")] pub String);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a reservation.
///
/// Every transition starts from `Pending`. `Delivered`, `Cancelled` and
/// `Rejected` are terminal; `Accepted` has no successors either, the backend
/// settles it out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aceptada")]
    Accepted,
    #[serde(rename = "rechazada")]
    Rejected,
    #[serde(rename = "entregada")]
    Delivered,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl ReservationState {
    pub const ALL: [ReservationState; 5] = [
        ReservationState::Pending,
        ReservationState::Accepted,
        ReservationState::Delivered,
        ReservationState::Cancelled,
        ReservationState::Rejected,
    ];

    /// Returns true if moving from self to `next` is legal.
    ///
    /// `Pending -> Delivered` skips `Accepted`: requesters can mark a pickup
    /// done without the owner ever accepting it.
    pub fn can_transition_to(&self, next: &ReservationState) -> bool {
        matches!(
            (self, next),
            (ReservationState::Pending, ReservationState::Accepted)
                | (ReservationState::Pending, ReservationState::Rejected)
                | (ReservationState::Pending, ReservationState::Cancelled)
                | (ReservationState::Pending, ReservationState::Delivered)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationState::Delivered | ReservationState::Cancelled | ReservationState::Rejected
        )
    }

    /// Position in reservation lists. Lower sorts first.
    pub fn display_priority(&self) -> u8 {
        match self {
            ReservationState::Pending => 0,
            ReservationState::Accepted => 1,
            ReservationState::Delivered => 2,
            ReservationState::Cancelled => 3,
            ReservationState::Rejected => 4,
        }
    }

    /// The name the backend uses in `estado` fields.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ReservationState::Pending => "pendiente",
            ReservationState::Accepted => "aceptada",
            ReservationState::Rejected => "rechazada",
            ReservationState::Delivered => "entregada",
            ReservationState::Cancelled => "cancelada",
        }
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReservationState::Pending => "pending",
            ReservationState::Accepted => "accepted",
            ReservationState::Rejected => "rejected",
            ReservationState::Delivered => "delivered",
            ReservationState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Something a user can do to a reservation from one of the lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationAction {
    Accept,
    Reject,
    Cancel,
    MarkDelivered,
    /// Hard delete. Not a state transition.
    Delete,
}

impl ReservationAction {
    /// State the reservation moves to, or `None` for deletion.
    pub fn target_state(self) -> Option<ReservationState> {
        match self {
            ReservationAction::Accept => Some(ReservationState::Accepted),
            ReservationAction::Reject => Some(ReservationState::Rejected),
            ReservationAction::Cancel => Some(ReservationState::Cancelled),
            ReservationAction::MarkDelivered => Some(ReservationState::Delivered),
            ReservationAction::Delete => None,
        }
    }

    /// Who performs the action.
    pub fn role(self) -> Role {
        match self {
            ReservationAction::Accept | ReservationAction::Reject => Role::Owner,
            ReservationAction::Cancel
            | ReservationAction::MarkDelivered
            | ReservationAction::Delete => Role::Requester,
        }
    }

    /// Actions offered to `role` for a reservation in `state`, in display order.
    pub fn available(state: ReservationState, role: Role) -> Vec<ReservationAction> {
        [
            ReservationAction::Accept,
            ReservationAction::Reject,
            ReservationAction::Cancel,
            ReservationAction::MarkDelivered,
            ReservationAction::Delete,
        ]
        .into_iter()
        .filter(|action| action.role() == role)
        .filter(|action| match action.target_state() {
            Some(target) => state.can_transition_to(&target),
            None => true,
        })
        .collect()
    }
}

impl fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReservationAction::Accept => "accept",
            ReservationAction::Reject => "reject",
            ReservationAction::Cancel => "cancel",
            ReservationAction::MarkDelivered => "mark delivered",
            ReservationAction::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// A claim by one user on a unit of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(rename = "id_producto")]
    pub product_id: ProductId,
    #[serde(rename = "id_usuario")]
    pub requester_id: UserId,
    #[serde(rename = "fecha_retiro", deserialize_with = "wire::timestamp")]
    pub pickup_time: DateTime<Utc>,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "estado")]
    pub state: ReservationState,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "wire::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "wire::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Order reservations the way every list shows them: by state priority,
/// keeping the backend's order within a state.
pub fn sort_for_display(reservations: &mut [Reservation]) {
    reservations.sort_by_key(|r| r.state.display_priority());
}
