use remeal_api_integration::harness::TestHarness;
use remeal_api_integration::pickup;
use remeal_client::{Feedback, ReservationError};
use remeal_common::rating::RatingInvitation;
use remeal_common::validation::ValidationError;

/// Rating is blocked until the pickup has been marked delivered.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rating_requires_delivery() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.soup, pickup(), "for dinner")
        .await
        .unwrap();
    let invitation = RatingInvitation {
        product_id: h.soup.clone(),
        reservation_id: Some(created.id.clone()),
    };

    let mut prompt = h
        .alice
        .manager
        .rating_prompt(invitation.clone())
        .await
        .unwrap();
    assert!(prompt.is_blocked());
    prompt.set_score(5);
    prompt.set_comment("lovely");
    let err = prompt.submit().await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Validation(ValidationError::NoEligibleReservation { .. })
    ));
    assert_eq!(h.backend.rating_count().await, 0);

    h.alice.manager.refresh_mine().await.unwrap();
    let delivery = h.alice.manager.mark_delivered(&created.id).await.unwrap();
    assert_eq!(delivery.invitation, invitation);

    let mut prompt = h
        .alice
        .manager
        .rating_prompt(delivery.invitation)
        .await
        .unwrap();
    assert!(!prompt.is_blocked());
    prompt.set_score(4);
    prompt.set_comment("Still warm, thanks!");
    let rating = prompt.submit().await.unwrap();

    assert_eq!(rating.reservation_id, created.id);
    assert_eq!(rating.product_id, h.soup);
    assert_eq!(rating.score.get(), 4);
    assert_eq!(rating.comment, "Still warm, thanks!");
    assert!(matches!(prompt.feedback(), Some(Feedback::Success(_))));
    assert_eq!(h.backend.rating_count().await, 1);
}

/// The prompt finds the delivered reservation when only the product is known,
/// and a second rating of the same pickup is refused by the backend.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rating_by_product_and_duplicate() {
    let h = TestHarness::setup().await;
    let created = h
        .bob
        .manager
        .create_reservation(&h.bread, pickup(), "two please")
        .await
        .unwrap();
    h.bob.manager.refresh_mine().await.unwrap();
    h.bob.manager.mark_delivered(&created.id).await.unwrap();

    let by_product = RatingInvitation {
        product_id: h.bread.clone(),
        reservation_id: None,
    };
    let mut prompt = h.bob.manager.rating_prompt(by_product.clone()).await.unwrap();
    prompt.set_score(5);
    prompt.set_comment("great");
    assert_eq!(prompt.submit().await.unwrap().reservation_id, created.id);

    let mut again = h.bob.manager.rating_prompt(by_product).await.unwrap();
    again.set_score(1);
    again.set_comment("changed my mind");
    let err = again.submit().await.unwrap_err();
    assert!(matches!(err, ReservationError::Network(ref e) if e.status() == Some(409)));
    assert!(matches!(again.feedback(), Some(Feedback::Error(m)) if m.contains("ya fue valorada")));
    assert_eq!(again.comment(), "changed my mind");
}

/// Another user's delivered reservation does not make the product rateable.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rating_is_per_requester() {
    let h = TestHarness::setup().await;
    let created = h
        .alice
        .manager
        .create_reservation(&h.bread, pickup(), "mine")
        .await
        .unwrap();
    h.alice.manager.refresh_mine().await.unwrap();
    h.alice.manager.mark_delivered(&created.id).await.unwrap();

    let prompt = h
        .bob
        .manager
        .rating_prompt(RatingInvitation {
            product_id: h.bread.clone(),
            reservation_id: Some(created.id),
        })
        .await
        .unwrap();
    assert!(prompt.is_blocked());
    assert!(prompt.blocked_reason().is_some());
}
