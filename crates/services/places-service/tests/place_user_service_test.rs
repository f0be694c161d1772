//! Reads and single-document edits of places and profiles.

mod support;

use uuid::Uuid;

use common::AppError;
use places_service_lib::service::{ServiceContainer, UpdatePlaceRequest};
use support::{cafe_request, harness, seed_user, DEFAULT_IMAGE};

#[tokio::test]
async fn test_places_by_user_in_creation_order() {
    let h = harness();
    let owner = seed_user(h.store.as_ref(), "a@example.com", "password-a").await;
    let consistency = h.services.consistency();

    let first = consistency.create_place(owner.id, cafe_request()).await.unwrap();
    let second = consistency.create_place(owner.id, cafe_request()).await.unwrap();

    let listed: Vec<Uuid> = h
        .services
        .places()
        .places_by_user(owner.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_places_by_missing_user_is_not_found() {
    let h = harness();

    let result = h.services.places().places_by_user(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_update_place_unknown_address_keeps_place() {
    let h = harness();
    let owner = seed_user(h.store.as_ref(), "a@example.com", "password-a").await;
    let place = h
        .services
        .consistency()
        .create_place(owner.id, cafe_request())
        .await
        .unwrap();

    let result = h
        .services
        .places()
        .update_place(
            place.id,
            owner.id,
            UpdatePlaceRequest {
                title: "Bistro".to_string(),
                description: "Now serving dinner".to_string(),
                address: "Nowhere at all".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Geocode(_))));
    let stored = h.services.places().get_place(place.id).await.unwrap();
    assert_eq!(stored.title, "Cafe");
}

#[tokio::test]
async fn test_list_users_returns_everyone() {
    let h = harness();
    let a = seed_user(h.store.as_ref(), "a@example.com", "password-a").await;
    let b = seed_user(h.store.as_ref(), "b@example.com", "password-b").await;

    let users = h.services.users().list_users().await.unwrap();
    let ids: Vec<Uuid> = users.into_iter().map(|u| u.id).collect();

    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id) && ids.contains(&b.id));
}

#[tokio::test]
async fn test_profile_image_replace_then_reset() {
    let h = harness();
    let user = seed_user(h.store.as_ref(), "a@example.com", "password-a").await;
    let users = h.services.users();

    users
        .update_profile_image(user.id, user.id, "uploads/images/one.png".to_string())
        .await
        .unwrap();
    users
        .update_profile_image(user.id, user.id, "uploads/images/two.png".to_string())
        .await
        .unwrap();
    let reset = users.delete_profile_image(user.id, user.id).await.unwrap();

    assert_eq!(reset.image, DEFAULT_IMAGE);
    assert_eq!(
        h.blobs.deleted(),
        vec![
            "uploads/images/one.png".to_string(),
            "uploads/images/two.png".to_string()
        ]
    );
}

#[tokio::test]
async fn test_profile_image_of_someone_else_is_forbidden() {
    let h = harness();
    let user = seed_user(h.store.as_ref(), "a@example.com", "password-a").await;
    let other = seed_user(h.store.as_ref(), "b@example.com", "password-b").await;

    let result = h
        .services
        .users()
        .delete_profile_image(user.id, other.id)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}
