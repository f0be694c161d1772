//! Signup, login and token verification through the service container.

mod support;

use common::AppError;
use places_service_lib::infra::{MemoryStore, UnitOfWork};
use places_service_lib::service::{LoginRequest, ServiceContainer, SignupRequest};
use support::{harness, harness_with, DEFAULT_IMAGE};

const CUSTOM_DEFAULT: &str = "uploads/images/custom-default.png";

fn signup(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Ada".to_string(),
        email: email.to_string(),
        password: "analytical".to_string(),
    }
}

#[tokio::test]
async fn test_signup_then_login() {
    let h = harness();
    let auth = h.services.auth();

    let session = auth.signup(signup("Ada@Example.com")).await.unwrap();
    assert_eq!(session.email, "ada@example.com");

    let stored = h.store.users().find_by_id(session.user_id).await.unwrap().unwrap();
    assert_eq!(stored.image, DEFAULT_IMAGE);
    assert!(stored.places.is_empty());
    assert!(stored.saved_places.is_empty());

    let login = auth
        .login(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.user_id, session.user_id);

    let claims = auth.verify_token(&format!("Bearer {}", login.token)).unwrap();
    assert_eq!(claims.sub, session.user_id);
}

#[tokio::test]
async fn test_signup_with_taken_email() {
    let h = harness();
    let auth = h.services.auth();
    auth.signup(signup("ada@example.com")).await.unwrap();

    let result = auth.signup(signup("ADA@example.com")).await;

    assert!(matches!(result, Err(AppError::DuplicateEmail)));
    assert_eq!(h.store.counts().await, (1, 0));
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let h = harness();
    let request = SignupRequest {
        password: "short".to_string(),
        ..signup("ada@example.com")
    };

    let result = h.services.auth().signup(request).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.store.counts().await, (0, 0));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let h = harness();
    let auth = h.services.auth();
    auth.signup(signup("ada@example.com")).await.unwrap();

    let result = auth
        .login(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "difference".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_signup_uses_configured_default_image() {
    let h = harness_with(MemoryStore::new(), CUSTOM_DEFAULT);

    let session = h.services.auth().signup(signup("ada@example.com")).await.unwrap();

    let stored = h.store.users().find_by_id(session.user_id).await.unwrap().unwrap();
    assert_eq!(stored.image, CUSTOM_DEFAULT);
}

#[tokio::test]
async fn test_configured_default_image_survives_account_changes() {
    let h = harness_with(MemoryStore::new(), CUSTOM_DEFAULT);
    let first = h.services.auth().signup(signup("ada@example.com")).await.unwrap();
    let second = h.services.auth().signup(signup("bob@example.com")).await.unwrap();

    h.services
        .users()
        .update_profile_image(first.user_id, first.user_id, "uploads/images/ada.png".to_string())
        .await
        .unwrap();
    h.services
        .consistency()
        .delete_user(second.user_id, "analytical".to_string())
        .await
        .unwrap();

    assert!(h.blobs.deleted().is_empty());
    let reset = h
        .services
        .users()
        .delete_profile_image(first.user_id, first.user_id)
        .await
        .unwrap();
    assert_eq!(reset.image, CUSTOM_DEFAULT);
    assert_eq!(h.blobs.deleted(), vec!["uploads/images/ada.png".to_string()]);
}
