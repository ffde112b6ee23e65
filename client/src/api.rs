use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use remeal_common::rating::Rating;
use remeal_common::reservation::{Reservation, ReservationId, ReservationState};
use remeal_common::wire::{
    self, CreateRatingRequest, CreateReservationRequest, StateUpdateRequest,
};

use crate::context::RequestContext;
use crate::error::{ApiError, NetworkError};

/// Backend endpoints used by the reservation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreateReservation,
    ListMine,
    ListForMyProducts,
    UpdateState,
    Review,
    DeleteReservation,
    CreateRating,
}

impl Endpoint {
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::CreateReservation => "POST /api/reservas",
            Endpoint::ListMine => "GET /api/reservas/mis",
            Endpoint::ListForMyProducts => "GET /api/reservas/mis-productos",
            Endpoint::UpdateState => "PUT /api/reservas/:id",
            Endpoint::Review => "PUT /api/reservas/:id/aprobar",
            Endpoint::DeleteReservation => "DELETE /api/reservas/:id",
            Endpoint::CreateRating => "POST /api/valoraciones",
        }
    }
}

/// The backend as seen by the reservation flow.
///
/// Implementations own no reservation state. Every call is one round trip.
#[allow(async_fn_in_trait)]
pub trait ReservationApi {
    async fn create_reservation(
        &self,
        request: &CreateReservationRequest,
    ) -> Result<Reservation, ApiError>;

    /// Reservations the current user made.
    async fn my_reservations(&self) -> Result<Vec<Reservation>, ApiError>;

    /// Reservations other users made on the current user's products.
    async fn reservations_for_my_products(&self) -> Result<Vec<Reservation>, ApiError>;

    /// Generic state change (cancel, mark delivered).
    async fn update_state(
        &self,
        id: &ReservationId,
        state: ReservationState,
    ) -> Result<Reservation, ApiError>;

    /// Owner decision on a pending reservation: accepted or rejected.
    async fn review(
        &self,
        id: &ReservationId,
        decision: ReservationState,
    ) -> Result<Reservation, ApiError>;

    async fn delete_reservation(&self, id: &ReservationId) -> Result<(), ApiError>;

    async fn create_rating(&self, request: &CreateRatingRequest) -> Result<Rating, ApiError>;
}

/// [`ReservationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct ReservationClient {
    ctx: RequestContext,
}

impl ReservationClient {
    pub fn new(ctx: RequestContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    async fn call<B, T>(
        &self,
        endpoint: Endpoint,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.ctx.request(method, segments);
        if let Some(body) = body {
            request = request.json(body);
        }
        tracing::debug!("{}", endpoint.label());
        let response = request
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                endpoint: endpoint.label(),
                source,
            })?;
        read_body(endpoint, response).await
    }
}

/// Map a response to `T`, turning non-2xx statuses into [`NetworkError::Status`]
/// with the server's message when it sent one.
async fn read_body<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| NetworkError::Transport {
            endpoint: endpoint.label(),
            source,
        })?;

    if !status.is_success() {
        let message = wire::error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
        return Err(NetworkError::Status {
            endpoint: endpoint.label(),
            status: status.as_u16(),
            message,
        }
        .into());
    }

    Ok(wire::decode(endpoint.label(), &body)?)
}

impl ReservationApi for ReservationClient {
    async fn create_reservation(
        &self,
        request: &CreateReservationRequest,
    ) -> Result<Reservation, ApiError> {
        self.call(
            Endpoint::CreateReservation,
            Method::POST,
            &["api", "reservas"],
            Some(request),
        )
        .await
    }

    async fn my_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.call::<(), _>(
            Endpoint::ListMine,
            Method::GET,
            &["api", "reservas", "mis"],
            None,
        )
        .await
    }

    async fn reservations_for_my_products(&self) -> Result<Vec<Reservation>, ApiError> {
        self.call::<(), _>(
            Endpoint::ListForMyProducts,
            Method::GET,
            &["api", "reservas", "mis-productos"],
            None,
        )
        .await
    }

    async fn update_state(
        &self,
        id: &ReservationId,
        state: ReservationState,
    ) -> Result<Reservation, ApiError> {
        self.call(
            Endpoint::UpdateState,
            Method::PUT,
            &["api", "reservas", id.0.as_str()],
            Some(&StateUpdateRequest { estado: state }),
        )
        .await
    }

    async fn review(
        &self,
        id: &ReservationId,
        decision: ReservationState,
    ) -> Result<Reservation, ApiError> {
        self.call(
            Endpoint::Review,
            Method::PUT,
            &["api", "reservas", id.0.as_str(), "aprobar"],
            Some(&StateUpdateRequest { estado: decision }),
        )
        .await
    }

    async fn delete_reservation(&self, id: &ReservationId) -> Result<(), ApiError> {
        // The body is a free-form acknowledgement; only its status matters.
        let _: serde_json::Value = self
            .call::<(), _>(
                Endpoint::DeleteReservation,
                Method::DELETE,
                &["api", "reservas", id.0.as_str()],
                None,
            )
            .await
            .or_else(|e| match e {
                ApiError::Schema(_) => Ok(serde_json::Value::Null),
                other => Err(other),
            })?;
        Ok(())
    }

    async fn create_rating(&self, request: &CreateRatingRequest) -> Result<Rating, ApiError> {
        self.call(
            Endpoint::CreateRating,
            Method::POST,
            &["api", "valoraciones"],
            Some(request),
        )
        .await
    }
}
