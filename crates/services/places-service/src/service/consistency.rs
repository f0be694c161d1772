//! Consistency manager - multi-document mutations over users and places.
//!
//! Every operation here writes to more than one document. Each runs in a
//! single unit-of-work transaction, reads what it decides on inside that
//! transaction, and touches image files only after the commit.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::requests::{validate_request, CreatePlaceRequest};
use crate::external::{discard_images, BlobStore, Geocoder, PasswordHasher};
use crate::infra::UnitOfWork;
use common::{AppError, AppResult, OptionExt};
use domain::Place;

/// Consistency service trait for dependency injection.
#[async_trait]
pub trait ConsistencyService: Send + Sync {
    /// Geocode, insert the place and append it to the owner's `places`.
    async fn create_place(&self, owner_id: Uuid, request: CreatePlaceRequest) -> AppResult<Place>;

    /// Delete a place owned by the requester and purge every reference to it.
    async fn delete_place(&self, place_id: Uuid, requester_id: Uuid) -> AppResult<()>;

    /// Delete an account, its places and every reference to either.
    async fn delete_user(&self, user_id: Uuid, password: String) -> AppResult<()>;

    /// Bookmark a place. Returns false if it was already saved.
    async fn save_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<bool>;

    /// Remove a bookmark. Returns false if there was none.
    async fn unsave_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<bool>;
}

/// Concrete implementation of ConsistencyService using Unit of Work.
pub struct ConsistencyManager<U: UnitOfWork> {
    uow: Arc<U>,
    geocoder: Arc<dyn Geocoder>,
    hasher: Arc<dyn PasswordHasher>,
    blobs: Arc<dyn BlobStore>,
    default_profile_image: String,
}

impl<U: UnitOfWork> ConsistencyManager<U> {
    pub fn new(
        uow: Arc<U>,
        geocoder: Arc<dyn Geocoder>,
        hasher: Arc<dyn PasswordHasher>,
        blobs: Arc<dyn BlobStore>,
        default_profile_image: String,
    ) -> Self {
        Self {
            uow,
            geocoder,
            hasher,
            blobs,
            default_profile_image,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ConsistencyService for ConsistencyManager<U> {
    #[tracing::instrument(skip(self, request))]
    async fn create_place(&self, owner_id: Uuid, request: CreatePlaceRequest) -> AppResult<Place> {
        validate_request(&request)?;

        let location = self.geocoder.geocode(&request.address).await?;

        self.uow
            .users()
            .find_by_id(owner_id)
            .await?
            .ok_or_not_found()?;

        let place = Place::new(
            request.title,
            request.description,
            request.address,
            location,
            request.image,
            owner_id,
        );

        let place = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    tx.places().insert(&place).await?;
                    tx.users().push_place(place.creator, place.id).await?;
                    Ok(place)
                })
            })
            .await?;

        tracing::info!(place_id = %place.id, "Place created");
        Ok(place)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_place(&self, place_id: Uuid, requester_id: Uuid) -> AppResult<()> {
        let image = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let place = tx.places().find_by_id(place_id).await?.ok_or_not_found()?;
                    if !place.is_owned_by(requester_id) {
                        return Err(AppError::Unauthorized);
                    }

                    let purged = tx.users().pull_saved_everywhere(place.id).await?;
                    tx.places().delete(place.id).await?;
                    tx.users().pull_place(place.creator, place.id).await?;

                    tracing::debug!(purged, "Saved copies removed");
                    Ok(place.image)
                })
            })
            .await?;

        tracing::info!("Place deleted");
        discard_images(self.blobs.as_ref(), [image], &self.default_profile_image).await;
        Ok(())
    }

    #[tracing::instrument(skip(self, password))]
    async fn delete_user(&self, user_id: Uuid, password: String) -> AppResult<()> {
        let hasher = self.hasher.clone();

        let images = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let user = tx
                        .users()
                        .find_by_id(user_id)
                        .await?
                        .ok_or(AppError::Forbidden)?;
                    if !hasher.verify(&password, &user.password_hash) {
                        return Err(AppError::Forbidden);
                    }

                    let owned = tx.places().find_by_creator(user_id).await?;
                    let mut images = Vec::with_capacity(owned.len() + 1);
                    for place in owned {
                        tx.users().pull_saved_everywhere(place.id).await?;
                        tx.places().delete(place.id).await?;
                        images.push(place.image);
                    }

                    let unsaved = tx.places().remove_saver_everywhere(user_id).await?;
                    tx.users().delete(user_id).await?;

                    tracing::debug!(places = images.len(), unsaved, "Account contents removed");
                    images.push(user.image);
                    Ok(images)
                })
            })
            .await?;

        tracing::info!("User deleted");
        discard_images(self.blobs.as_ref(), images, &self.default_profile_image).await;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn save_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<bool> {
        let changed = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let user = tx.users().find_by_id(user_id).await?.ok_or_not_found()?;
                    let place = tx.places().find_by_id(place_id).await?.ok_or_not_found()?;

                    if place.is_owned_by(user_id) {
                        return Err(AppError::validation("You cannot save your own place."));
                    }
                    if user.has_saved(place_id) && place.is_saved_by(user_id) {
                        return Ok(false);
                    }

                    tx.users().push_saved(user_id, &place.snapshot()).await?;
                    tx.places().add_saver(place_id, user_id).await?;
                    Ok(true)
                })
            })
            .await?;

        if changed {
            tracing::info!("Place saved");
        }
        Ok(changed)
    }

    #[tracing::instrument(skip(self))]
    async fn unsave_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<bool> {
        let changed = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let user = tx.users().find_by_id(user_id).await?.ok_or_not_found()?;
                    let place = tx.places().find_by_id(place_id).await?;

                    let on_user = user.has_saved(place_id);
                    let on_place = place.as_ref().is_some_and(|p| p.is_saved_by(user_id));
                    if !on_user && !on_place {
                        return Ok(false);
                    }

                    if on_user {
                        tx.users().pull_saved(user_id, place_id).await?;
                    }
                    if on_place {
                        tx.places().remove_saver(place_id, user_id).await?;
                    }
                    Ok(true)
                })
            })
            .await?;

        if changed {
            tracing::info!("Place unsaved");
        }
        Ok(changed)
    }
}
