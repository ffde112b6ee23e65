use std::collections::HashMap;

use remeal_common::identity::Role;
use remeal_common::rating::RatingInvitation;
use remeal_common::reservation::{
    sort_for_display, Reservation, ReservationAction, ReservationId, ReservationState,
};

use crate::api::ReservationApi;
use crate::error::ReservationError;
use crate::lifecycle::ReservationLifecycleManager;

/// One reservation plus the actions its viewer may take on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRow {
    pub reservation: Reservation,
    pub actions: Vec<ReservationAction>,
}

impl ReservationRow {
    pub fn offers(&self, action: ReservationAction) -> bool {
        self.actions.contains(&action)
    }
}

/// A reservation list as seen by a requester (their own reservations) or an
/// owner (reservations on their products).
#[derive(Debug, Clone)]
pub struct ReservationListView {
    role: Role,
    rows: Vec<ReservationRow>,
    errors: HashMap<ReservationId, String>,
}

impl ReservationListView {
    pub fn new(role: Role) -> Self {
        Self::from_reservations(role, Vec::new())
    }

    pub fn from_reservations(role: Role, mut reservations: Vec<Reservation>) -> Self {
        let mut view = Self {
            role,
            rows: Vec::new(),
            errors: HashMap::new(),
        };
        sort_for_display(&mut reservations);
        view.rebuild(reservations);
        view
    }

    fn rebuild(&mut self, reservations: Vec<Reservation>) {
        let role = self.role;
        self.rows = reservations
            .into_iter()
            .map(|reservation| ReservationRow {
                actions: ReservationAction::available(reservation.state, role),
                reservation,
            })
            .collect();
        let rows = &self.rows;
        self.errors
            .retain(|id, _| rows.iter().any(|row| row.reservation.id == *id));
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn rows(&self) -> &[ReservationRow] {
        &self.rows
    }

    pub fn row(&self, id: &ReservationId) -> Option<&ReservationRow> {
        self.rows.iter().find(|row| row.reservation.id == *id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows grouped by state, groups in priority order.
    pub fn groups(&self) -> Vec<(ReservationState, &[ReservationRow])> {
        self.rows
            .chunk_by(|a, b| a.reservation.state == b.reservation.state)
            .map(|chunk| (chunk[0].reservation.state, chunk))
            .collect()
    }

    /// Inline message left on a row by its last failed action.
    pub fn error_for(&self, id: &ReservationId) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    /// Re-fetch the list this view shows.
    pub async fn reload<A: ReservationApi>(
        &mut self,
        manager: &ReservationLifecycleManager<A>,
    ) -> Result<(), ReservationError> {
        let mut reservations = match self.role {
            Role::Requester => manager.refresh_mine().await?,
            Role::Owner => manager.refresh_incoming().await?,
        };
        sort_for_display(&mut reservations);
        self.rebuild(reservations);
        Ok(())
    }

    /// Run `action` on a row, then reload.
    ///
    /// Returns the rating invitation when the action delivered the reservation.
    pub async fn dispatch<A: ReservationApi>(
        &mut self,
        manager: &ReservationLifecycleManager<A>,
        id: &ReservationId,
        action: ReservationAction,
    ) -> Result<Option<RatingInvitation>, ReservationError> {
        let row = self
            .row(id)
            .ok_or_else(|| ReservationError::UnknownReservation(id.clone()))?;
        if !row.offers(action) {
            return Err(ReservationError::ActionUnavailable {
                id: id.clone(),
                action,
                state: row.reservation.state,
            });
        }

        let result = match action {
            ReservationAction::Delete => manager.delete_reservation(id).await.map(|()| None),
            ReservationAction::MarkDelivered => manager
                .mark_delivered(id)
                .await
                .map(|delivery| Some(delivery.invitation)),
            ReservationAction::Accept => manager
                .transition(id, ReservationState::Accepted)
                .await
                .map(|_| None),
            ReservationAction::Reject => manager
                .transition(id, ReservationState::Rejected)
                .await
                .map(|_| None),
            ReservationAction::Cancel => manager
                .transition(id, ReservationState::Cancelled)
                .await
                .map(|_| None),
        };

        match result {
            Ok(invitation) => {
                self.errors.remove(id);
                self.reload(manager).await?;
                Ok(invitation)
            }
            Err(e) => {
                self.errors.insert(id.clone(), e.to_string());
                Err(e)
            }
        }
    }
}
