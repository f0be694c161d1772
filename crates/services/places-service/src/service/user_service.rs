//! User service - Handles user-related business logic.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::external::{discard_images, BlobStore};
use crate::infra::UnitOfWork;
use common::{AppError, AppResult, OptionExt};
use domain::{SavedPlace, User};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn get_user(&self, user_id: Uuid) -> AppResult<User>;

    /// Snapshots of the places the user saved
    async fn saved_places(&self, user_id: Uuid) -> AppResult<Vec<SavedPlace>>;

    /// Point the profile at a newly uploaded image
    async fn update_profile_image(
        &self,
        user_id: Uuid,
        requester_id: Uuid,
        image: String,
    ) -> AppResult<User>;

    /// Reset the profile to the default image
    async fn delete_profile_image(&self, user_id: Uuid, requester_id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    blobs: Arc<dyn BlobStore>,
    default_profile_image: String,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>, blobs: Arc<dyn BlobStore>, default_profile_image: String) -> Self {
        Self {
            uow,
            blobs,
            default_profile_image,
        }
    }

    async fn replace_image(&self, user_id: Uuid, requester_id: Uuid, image: String) -> AppResult<User> {
        if user_id != requester_id {
            return Err(AppError::Forbidden);
        }

        let users = self.uow.users();
        let mut user = users.find_by_id(user_id).await?.ok_or_not_found()?;
        let previous = user.replace_image(image);
        users.update(&user).await?;

        tracing::info!("Profile image replaced");
        if previous != user.image {
            discard_images(self.blobs.as_ref(), [previous], &self.default_profile_image).await;
        }
        Ok(user)
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()
    }

    async fn saved_places(&self, user_id: Uuid) -> AppResult<Vec<SavedPlace>> {
        Ok(self.get_user(user_id).await?.saved_places)
    }

    #[tracing::instrument(skip(self))]
    async fn update_profile_image(
        &self,
        user_id: Uuid,
        requester_id: Uuid,
        image: String,
    ) -> AppResult<User> {
        if image.is_empty() {
            return Err(AppError::validation("An image is required."));
        }
        self.replace_image(user_id, requester_id, image).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_profile_image(&self, user_id: Uuid, requester_id: Uuid) -> AppResult<User> {
        let default = self.default_profile_image.clone();
        self.replace_image(user_id, requester_id, default).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::MockBlobStore;
    use crate::infra::MemoryStore;
    use mockall::predicate::eq;

    const DEFAULT_IMAGE: &str = "uploads/images/user-profile-default.png";

    async fn seeded(image: &str) -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = User::new(
            "Someone".to_string(),
            "someone@example.com".to_string(),
            "hash".to_string(),
            image.to_string(),
        );
        store.users().insert(&user).await.unwrap();
        (store, user)
    }

    fn manager(store: &MemoryStore, blobs: MockBlobStore) -> UserManager<MemoryStore> {
        UserManager::new(Arc::new(store.clone()), Arc::new(blobs), DEFAULT_IMAGE.to_string())
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let store = MemoryStore::new();
        let service = manager(&store, MockBlobStore::new());

        let result = service.get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_profile_image_by_other_user_is_forbidden() {
        let (store, user) = seeded(DEFAULT_IMAGE).await;
        let mut blobs = MockBlobStore::new();
        blobs.expect_delete().never();
        let service = manager(&store, blobs);

        let result = service
            .update_profile_image(user.id, Uuid::new_v4(), "uploads/images/me.png".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        assert_eq!(service.get_user(user.id).await.unwrap().image, DEFAULT_IMAGE);
    }

    #[tokio::test]
    async fn test_update_profile_image_keeps_default_file() {
        let (store, user) = seeded(DEFAULT_IMAGE).await;
        let mut blobs = MockBlobStore::new();
        blobs.expect_delete().never();
        let service = manager(&store, blobs);

        let updated = service
            .update_profile_image(user.id, user.id, "uploads/images/me.png".to_string())
            .await
            .unwrap();

        assert_eq!(updated.image, "uploads/images/me.png");
    }

    #[tokio::test]
    async fn test_delete_profile_image_restores_default() {
        let (store, user) = seeded("uploads/images/me.png").await;
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_delete()
            .with(eq("uploads/images/me.png"))
            .times(1)
            .returning(|_| Ok(()));
        let service = manager(&store, blobs);

        let updated = service.delete_profile_image(user.id, user.id).await.unwrap();

        assert_eq!(updated.image, DEFAULT_IMAGE);
        assert_eq!(service.get_user(user.id).await.unwrap().image, DEFAULT_IMAGE);
    }
}
