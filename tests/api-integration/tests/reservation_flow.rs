use remeal_api_integration::harness::TestHarness;
use remeal_api_integration::pickup;
use remeal_client::ReservationError;
use remeal_common::identity::{Role, UserId};
use remeal_common::product::ProductStatus;
use remeal_common::reservation::{ReservationAction, ReservationState};

/// Alice reserves, Gary accepts, and both lists agree after re-fetching.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn owner_accepts_a_reservation() {
    let h = TestHarness::setup().await;
    let at = pickup();

    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, at, "I'll come after work")
        .await
        .unwrap();
    assert_eq!(created.state, ReservationState::Pending);
    assert_eq!(created.product_id, h.bread);
    assert_eq!(created.requester_id, UserId(h.alice.user_id.to_string()));
    assert_eq!(created.pickup_time.timestamp(), at.timestamp());
    assert!(created.created_at.is_some());

    let mut incoming = h.gary.view(Role::Owner).await;
    let row = incoming.row(&created.id).unwrap();
    assert_eq!(
        row.actions,
        [ReservationAction::Accept, ReservationAction::Reject]
    );

    incoming
        .dispatch(&h.gary.manager, &created.id, ReservationAction::Accept)
        .await
        .unwrap();
    assert_eq!(
        incoming.row(&created.id).unwrap().reservation.state,
        ReservationState::Accepted
    );

    let mine = h.alice.view(Role::Requester).await;
    let row = mine.row(&created.id).unwrap();
    assert_eq!(row.reservation.state, ReservationState::Accepted);
    assert_eq!(row.actions, [ReservationAction::Delete]);
}

/// Stock projection follows confirmed reservations down to zero.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stock_runs_out() {
    let h = TestHarness::setup().await;

    for _ in 0..2 {
        h.alice
            .manager
            .create_reservation(&h.bread, pickup(), "one loaf please")
            .await
            .unwrap();
    }
    let bread = h.alice.manager.product(&h.bread).await.unwrap();
    assert_eq!(bread.quantity(), 1);
    assert_eq!(bread.status(), ProductStatus::Available);

    h.alice
        .manager
        .create_reservation(&h.bread, pickup(), "last one")
        .await
        .unwrap();
    let bread = h.alice.manager.product(&h.bread).await.unwrap();
    assert_eq!(bread.quantity(), 0);
    assert_eq!(bread.status(), ProductStatus::Reserved);
    assert_eq!(h.backend.product_quantity(&h.bread).await, Some(0));

    // Bob's projection is stale; the backend refuses and his copy is untouched.
    let err = h
        .bob
        .manager
        .create_reservation(&h.bread, pickup(), "any left?")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Network(ref e) if e.status() == Some(409)));
    assert_eq!(err.to_string(), "POST /api/reservas returned 409: Producto sin stock");
    assert_eq!(h.bob.manager.product(&h.bread).await.unwrap().quantity(), 3);
}

/// Requester picks up the food; the delivery invites a rating.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn requester_marks_delivered() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.soup, pickup(), "for lunch")
        .await
        .unwrap();

    let mut mine = h.alice.view(Role::Requester).await;
    let invitation = mine
        .dispatch(&h.alice.manager, &created.id, ReservationAction::MarkDelivered)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(invitation.product_id, h.soup);
    assert_eq!(invitation.reservation_id, Some(created.id.clone()));
    assert_eq!(
        h.backend.reservation_state(&created.id).await,
        Some(ReservationState::Delivered)
    );
    assert_eq!(
        mine.row(&created.id).unwrap().reservation.state,
        ReservationState::Delivered
    );
}

/// Cancelling puts the unit back on the backend; only a re-fetch shows it.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_then_delete() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.soup, pickup(), "maybe")
        .await
        .unwrap();
    assert_eq!(h.backend.product_quantity(&h.soup).await, Some(0));

    let mut mine = h.alice.view(Role::Requester).await;
    mine.dispatch(&h.alice.manager, &created.id, ReservationAction::Cancel)
        .await
        .unwrap();
    assert_eq!(h.backend.product_quantity(&h.soup).await, Some(1));
    assert_eq!(
        mine.row(&created.id).unwrap().actions,
        [ReservationAction::Delete]
    );

    mine.dispatch(&h.alice.manager, &created.id, ReservationAction::Delete)
        .await
        .unwrap();
    assert!(mine.is_empty());
    assert_eq!(h.backend.reservation_state(&created.id).await, None);
}

/// Lists come back grouped by state priority regardless of backend order.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn incoming_list_is_ordered_by_state() {
    let h = TestHarness::setup().await;
    let mut ids = Vec::new();
    for message in ["first", "second", "third"] {
        let r = h
            .alice
            .manager
            .create_reservation(&h.bread, pickup(), message)
            .await
            .unwrap();
        ids.push(r.id);
    }

    let mut incoming = h.gary.view(Role::Owner).await;
    incoming
        .dispatch(&h.gary.manager, &ids[0], ReservationAction::Reject)
        .await
        .unwrap();
    incoming
        .dispatch(&h.gary.manager, &ids[1], ReservationAction::Accept)
        .await
        .unwrap();

    let states: Vec<_> = incoming
        .rows()
        .iter()
        .map(|row| row.reservation.state)
        .collect();
    assert_eq!(
        states,
        [
            ReservationState::Pending,
            ReservationState::Accepted,
            ReservationState::Rejected
        ]
    );
    assert_eq!(incoming.rows()[0].reservation.id, ids[2]);
    assert_eq!(incoming.groups().len(), 3);
}

/// Each user sees only their own reservations and only their products' ones.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lists_are_scoped_per_user() {
    let h = TestHarness::setup().await;
    h.alice
        .manager
        .create_reservation(&h.bread, pickup(), "alice")
        .await
        .unwrap();
    h.bob
        .manager
        .create_reservation(&h.bread, pickup(), "bob")
        .await
        .unwrap();

    assert_eq!(h.alice.view(Role::Requester).await.rows().len(), 1);
    assert_eq!(h.bob.view(Role::Requester).await.rows().len(), 1);
    assert_eq!(h.gary.view(Role::Owner).await.rows().len(), 2);
    assert!(h.alice.view(Role::Owner).await.is_empty());
}
