use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;

use remeal_api_integration::harness::{Participant, TestHarness};
use remeal_api_integration::{pickup, MockBackend};
use remeal_client::{
    ClientConfig, NetworkError, RequestContext, ReservationApi, ReservationClient,
    ReservationError, Session,
};
use remeal_common::identity::Role;
use remeal_common::reservation::{ReservationAction, ReservationState};
use remeal_common::validation::ValidationError;

/// Invalid input never leaves the client.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn validation_failures_issue_no_request() {
    let h = TestHarness::setup().await;

    let err = h
        .alice
        .manager
        .create_reservation(&h.bread, Utc::now(), "now is too late")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Validation(ValidationError::PickupNotInFuture { .. })
    ));

    let err = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "  ")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Validation(ValidationError::EmptyMessage)
    ));

    assert!(h.backend.requests().await.is_empty());
    assert_eq!(h.alice.manager.product(&h.bread).await.unwrap().quantity(), 3);
}

/// Terminal reservations are refused locally, before the backend is asked.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_transition_issues_no_request() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "soon")
        .await
        .unwrap();
    let mut mine = h.alice.view(Role::Requester).await;
    mine.dispatch(&h.alice.manager, &created.id, ReservationAction::Cancel)
        .await
        .unwrap();

    let before = h.backend.requests().await.len();
    let err = h
        .alice
        .manager
        .transition(&created.id, ReservationState::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::InvalidTransition {
            from: ReservationState::Cancelled,
            to: ReservationState::Delivered,
            ..
        }
    ));

    let err = mine
        .dispatch(&h.alice.manager, &created.id, ReservationAction::MarkDelivered)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::ActionUnavailable { .. }));
    assert_eq!(h.backend.requests().await.len(), before);
}

/// The owner acted while Alice's list was stale: the backend's message wins.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_list_surfaces_backend_conflict() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "soon")
        .await
        .unwrap();
    let mut mine = h.alice.view(Role::Requester).await;

    let mut incoming = h.gary.view(Role::Owner).await;
    incoming
        .dispatch(&h.gary.manager, &created.id, ReservationAction::Reject)
        .await
        .unwrap();

    let err = mine
        .dispatch(&h.alice.manager, &created.id, ReservationAction::Cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Network(ref e) if e.status() == Some(409)));
    assert!(mine
        .error_for(&created.id)
        .unwrap()
        .ends_with("La reserva ya no está pendiente"));

    mine.reload(&h.alice.manager).await.unwrap();
    assert_eq!(
        mine.row(&created.id).unwrap().reservation.state,
        ReservationState::Rejected
    );
}

/// A requester cannot review a reservation on someone else's product.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn review_is_owner_only() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "soon")
        .await
        .unwrap();

    let err = h
        .bob
        .manager
        .api()
        .review(&created.id, ReservationState::Accepted)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "PUT /api/reservas/:id/aprobar returned 403: No autorizado"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_token_is_unauthorized() {
    let backend = MockBackend::start().await;
    let config = ClientConfig::new(&backend.base_url()).unwrap();
    let ctx = RequestContext::new(
        &config,
        &Session {
            token: "forged".into(),
        },
    )
    .unwrap();
    let client = ReservationClient::new(ctx);

    let err = client.my_reservations().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "GET /api/reservas/mis returned 401: Token inválido"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn error_without_message_uses_status_reason() {
    let h = TestHarness::setup().await;
    h.backend
        .fail_next(StatusCode::SERVICE_UNAVAILABLE, "   ")
        .await;

    let err = h.alice.manager.refresh_mine().await.unwrap_err();
    match err {
        ReservationError::Network(NetworkError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

/// A 2xx body that does not fit the endpoint is a schema error, and a failed
/// create leaves the projection alone.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_success_body_is_a_schema_error() {
    let h = TestHarness::setup().await;

    h.backend.malformed_next().await;
    let err = h.alice.manager.refresh_mine().await.unwrap_err();
    assert!(matches!(err, ReservationError::Schema(ref e) if e.endpoint == "GET /api/reservas/mis"));

    h.backend.malformed_next().await;
    let err = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Schema(_)));
    assert_eq!(h.alice.manager.product(&h.bread).await.unwrap().quantity(), 3);
    assert_eq!(h.alice.manager.notice(), None);
}

/// Delete only cares about the status code.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delete_ignores_acknowledgement_body() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "soon")
        .await
        .unwrap();

    h.backend.malformed_next().await;
    h.alice.manager.delete_reservation(&created.id).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_backend_is_a_transport_error() {
    let backend = MockBackend::start().await;
    let url = backend.base_url();
    let alice = Participant::connect(&backend, "Alice").await;
    drop(backend);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = alice.manager.refresh_mine().await.unwrap_err();
    assert!(
        matches!(err, ReservationError::Network(NetworkError::Transport { .. })),
        "{url}: {err:?}"
    );
}
