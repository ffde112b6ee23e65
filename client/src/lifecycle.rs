//! Reservation state machine with optimistic product bookkeeping.
//!
//! Only creation touches local state, and only after the backend confirms it.
//! Transitions and deletions change nothing locally: callers re-fetch the
//! lists afterwards, because the backend may apply side effects of its own
//! (other reservations, product availability) that the client cannot predict.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};

use remeal_common::product::{ProductId, ProductProjection};
use remeal_common::rating::RatingInvitation;
use remeal_common::reservation::{Reservation, ReservationId, ReservationState};
use remeal_common::validation::validate_new_reservation;
use remeal_common::wire::CreateReservationRequest;

use crate::api::ReservationApi;
use crate::error::ReservationError;
use crate::guard::{ActionKind, InFlight};
use crate::notice::TransientNotice;
use crate::rating::RatingPrompt;

pub const RESERVATION_CREATED: &str = "Reservation created";

/// Result of a successful [`ReservationLifecycleManager::mark_delivered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub reservation: Reservation,
    /// Open a [`RatingPrompt`] with this.
    pub invitation: RatingInvitation,
}

/// Last fetched copy of each list. Each refresh replaces its list wholesale.
#[derive(Debug, Default)]
struct ReservationCache {
    mine: HashMap<ReservationId, Reservation>,
    incoming: HashMap<ReservationId, Reservation>,
}

impl ReservationCache {
    fn get(&self, id: &ReservationId) -> Option<&Reservation> {
        self.mine.get(id).or_else(|| self.incoming.get(id))
    }
}

pub struct ReservationLifecycleManager<A> {
    api: A,
    products: RwLock<HashMap<ProductId, ProductProjection>>,
    cache: RwLock<ReservationCache>,
    notice: TransientNotice,
    creating: InFlight,
    transitioning: InFlight,
    deleting: InFlight,
}

impl<A: ReservationApi> ReservationLifecycleManager<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            products: RwLock::new(HashMap::new()),
            cache: RwLock::new(ReservationCache::default()),
            notice: TransientNotice::new(),
            creating: InFlight::new(ActionKind::Create),
            transitioning: InFlight::new(ActionKind::Transition),
            deleting: InFlight::new(ActionKind::Delete),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Start tracking a product's stock, replacing any earlier projection.
    pub async fn track_product(&self, projection: ProductProjection) {
        self.products
            .write()
            .await
            .insert(projection.product_id.clone(), projection);
    }

    pub async fn product(&self, id: &ProductId) -> Option<ProductProjection> {
        self.products.read().await.get(id).cloned()
    }

    /// Cached copy of a reservation, as of the last list refresh.
    pub async fn reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.cache.read().await.get(id).cloned()
    }

    pub fn notice(&self) -> Option<String> {
        self.notice.current()
    }

    pub fn subscribe_notice(&self) -> watch::Receiver<Option<String>> {
        self.notice.subscribe()
    }

    pub fn is_busy(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Create => self.creating.is_busy(),
            ActionKind::Transition => self.transitioning.is_busy(),
            ActionKind::Delete => self.deleting.is_busy(),
        }
    }

    /// Reserve one unit of `product_id` for pickup at `pickup_time`.
    ///
    /// Validation happens before any request. The product projection is only
    /// decremented once the backend has confirmed the reservation.
    pub async fn create_reservation(
        &self,
        product_id: &ProductId,
        pickup_time: DateTime<Utc>,
        message: &str,
    ) -> Result<Reservation, ReservationError> {
        validate_new_reservation(pickup_time, message, Utc::now())?;
        let _ticket = self
            .creating
            .try_begin()
            .ok_or(ReservationError::Busy(ActionKind::Create))?;

        let request = CreateReservationRequest {
            id_producto: product_id.clone(),
            fecha_retiro: pickup_time,
            mensaje: message.to_string(),
        };
        let reservation = match self.api.create_reservation(&request).await {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::warn!("Reserving product {} failed: {}", product_id, e);
                return Err(e.into());
            }
        };

        if let Some(projection) = self.products.write().await.get_mut(product_id) {
            projection.record_reservation();
            tracing::debug!(
                "Product {} now has {} left ({})",
                product_id,
                projection.quantity(),
                projection.status()
            );
        }
        self.notice.show(RESERVATION_CREATED);
        tracing::info!("Created reservation {} for product {}", reservation.id, product_id);
        Ok(reservation)
    }

    /// Move a cached reservation to `target`.
    ///
    /// Legality is checked against the cached state before the request goes
    /// out. The cache is not patched with the result; refresh the list.
    pub async fn transition(
        &self,
        id: &ReservationId,
        target: ReservationState,
    ) -> Result<Reservation, ReservationError> {
        let current = self
            .reservation(id)
            .await
            .ok_or_else(|| ReservationError::UnknownReservation(id.clone()))?;
        if !current.state.can_transition_to(&target) {
            return Err(ReservationError::InvalidTransition {
                id: id.clone(),
                from: current.state,
                to: target,
            });
        }
        let _ticket = self
            .transitioning
            .try_begin()
            .ok_or(ReservationError::Busy(ActionKind::Transition))?;

        let result = match target {
            ReservationState::Accepted | ReservationState::Rejected => {
                self.api.review(id, target).await
            }
            _ => self.api.update_state(id, target).await,
        };
        match result {
            Ok(updated) => {
                tracing::info!("Reservation {} is now {}", id, updated.state);
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!("Moving reservation {} to {} failed: {}", id, target, e);
                Err(e.into())
            }
        }
    }

    /// Mark a pickup as done and hand back what the rating prompt needs.
    pub async fn mark_delivered(&self, id: &ReservationId) -> Result<Delivery, ReservationError> {
        let reservation = self.transition(id, ReservationState::Delivered).await?;
        let invitation = RatingInvitation {
            product_id: reservation.product_id.clone(),
            reservation_id: Some(reservation.id.clone()),
        };
        Ok(Delivery {
            reservation,
            invitation,
        })
    }

    /// Hard delete. Like transitions, the cache is left for the next refresh.
    pub async fn delete_reservation(&self, id: &ReservationId) -> Result<(), ReservationError> {
        let _ticket = self
            .deleting
            .try_begin()
            .ok_or(ReservationError::Busy(ActionKind::Delete))?;
        match self.api.delete_reservation(id).await {
            Ok(()) => {
                tracing::info!("Deleted reservation {}", id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Deleting reservation {} failed: {}", id, e);
                Err(e.into())
            }
        }
    }

    /// Fetch the current user's own reservations.
    pub async fn refresh_mine(&self) -> Result<Vec<Reservation>, ReservationError> {
        let list = self.api.my_reservations().await?;
        self.cache.write().await.mine = index(&list);
        Ok(list)
    }

    /// Fetch the reservations made on the current user's products.
    pub async fn refresh_incoming(&self) -> Result<Vec<Reservation>, ReservationError> {
        let list = self.api.reservations_for_my_products().await?;
        self.cache.write().await.incoming = index(&list);
        Ok(list)
    }

    /// Open a rating prompt for a delivered reservation.
    pub async fn rating_prompt(
        &self,
        invitation: RatingInvitation,
    ) -> Result<RatingPrompt<'_, A>, ReservationError> {
        RatingPrompt::open(&self.api, invitation).await
    }
}

fn index(list: &[Reservation]) -> HashMap<ReservationId, Reservation> {
    list.iter().map(|r| (r.id.clone(), r.clone())).collect()
}
