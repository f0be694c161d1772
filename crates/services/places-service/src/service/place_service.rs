//! Place service - reads and single-document edits of places.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::requests::{validate_request, UpdatePlaceRequest};
use crate::external::Geocoder;
use crate::infra::UnitOfWork;
use common::{AppError, AppResult, OptionExt};
use domain::Place;

/// Place service trait for dependency injection.
#[async_trait]
pub trait PlaceService: Send + Sync {
    /// Get place by ID
    async fn get_place(&self, place_id: Uuid) -> AppResult<Place>;

    /// Places a user created, in the order of their `places` list
    async fn places_by_user(&self, user_id: Uuid) -> AppResult<Vec<Place>>;

    /// Edit title, description and address; the address is geocoded again.
    ///
    /// Snapshots already saved by other users keep the old values.
    async fn update_place(
        &self,
        place_id: Uuid,
        requester_id: Uuid,
        request: UpdatePlaceRequest,
    ) -> AppResult<Place>;
}

/// Concrete implementation of PlaceService using Unit of Work.
pub struct PlaceManager<U: UnitOfWork> {
    uow: Arc<U>,
    geocoder: Arc<dyn Geocoder>,
}

impl<U: UnitOfWork> PlaceManager<U> {
    pub fn new(uow: Arc<U>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { uow, geocoder }
    }
}

#[async_trait]
impl<U: UnitOfWork> PlaceService for PlaceManager<U> {
    async fn get_place(&self, place_id: Uuid) -> AppResult<Place> {
        self.uow.places().find_by_id(place_id).await?.ok_or_not_found()
    }

    async fn places_by_user(&self, user_id: Uuid) -> AppResult<Vec<Place>> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;
        let mut places = self.uow.places().find_by_creator(user_id).await?;

        let order: HashMap<Uuid, usize> = user
            .places
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        places.sort_by_key(|p| order.get(&p.id).copied().unwrap_or(usize::MAX));
        Ok(places)
    }

    #[tracing::instrument(skip(self, request))]
    async fn update_place(
        &self,
        place_id: Uuid,
        requester_id: Uuid,
        request: UpdatePlaceRequest,
    ) -> AppResult<Place> {
        validate_request(&request)?;

        let places = self.uow.places();
        let mut place = places.find_by_id(place_id).await?.ok_or_not_found()?;
        if !place.is_owned_by(requester_id) {
            return Err(AppError::Unauthorized);
        }

        let location = self.geocoder.geocode(&request.address).await?;
        place.revise(request.title, request.description, request.address, location);
        places.update(&place).await?;

        tracing::info!("Place updated");
        Ok(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::MockGeocoder;
    use crate::infra::{TransactionContext, TxFuture};
    use crate::repository::{MockPlaceRepository, MockUserRepository, PlaceRepository, UserRepository};
    use domain::{Location, User};
    use mockall::predicate::eq;

    /// UnitOfWork over mock repositories; transactions are not expected here.
    struct TestUnitOfWork {
        user_repo: Arc<MockUserRepository>,
        place_repo: Arc<MockPlaceRepository>,
    }

    impl TestUnitOfWork {
        fn new(user_repo: MockUserRepository, place_repo: MockPlaceRepository) -> Self {
            Self {
                user_repo: Arc::new(user_repo),
                place_repo: Arc::new(place_repo),
            }
        }
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.user_repo.clone()
        }

        fn places(&self) -> Arc<dyn PlaceRepository> {
            self.place_repo.clone()
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            Err(AppError::internal("Transactions not supported in test mock"))
        }
    }

    fn place_owned_by(creator: Uuid) -> Place {
        Place::new(
            "Cafe".to_string(),
            "Good coffee".to_string(),
            "123 Main St".to_string(),
            Location::new(10.0, 20.0),
            "uploads/images/cafe.png".to_string(),
            creator,
        )
    }

    fn update_request() -> UpdatePlaceRequest {
        UpdatePlaceRequest {
            title: "Bistro".to_string(),
            description: "Now serving dinner".to_string(),
            address: "9 Side St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_place_not_found() {
        let mut places = MockPlaceRepository::new();
        places.expect_find_by_id().returning(|_| Ok(None));

        let uow = TestUnitOfWork::new(MockUserRepository::new(), places);
        let service = PlaceManager::new(Arc::new(uow), Arc::new(MockGeocoder::new()));

        let result = service.get_place(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_places_by_user_follows_ownership_order() {
        let mut owner = User::new(
            "Owner".to_string(),
            "owner@example.com".to_string(),
            "hash".to_string(),
            "uploads/images/owner.png".to_string(),
        );
        let first = place_owned_by(owner.id);
        let second = place_owned_by(owner.id);
        owner.push_place(second.id);
        owner.push_place(first.id);

        let owner_id = owner.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(owner_id))
            .returning(move |_| Ok(Some(owner.clone())));

        let expected = vec![second.id, first.id];
        let mut places = MockPlaceRepository::new();
        places
            .expect_find_by_creator()
            .with(eq(owner_id))
            .returning(move |_| Ok(vec![first.clone(), second.clone()]));

        let uow = TestUnitOfWork::new(users, places);
        let service = PlaceManager::new(Arc::new(uow), Arc::new(MockGeocoder::new()));

        let listed: Vec<Uuid> = service
            .places_by_user(owner_id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn test_update_place_by_non_owner_is_unauthorized() {
        let place = place_owned_by(Uuid::new_v4());
        let place_id = place.id;

        let mut places = MockPlaceRepository::new();
        places
            .expect_find_by_id()
            .returning(move |_| Ok(Some(place.clone())));
        places.expect_update().never();

        let mut geocoder = MockGeocoder::new();
        geocoder.expect_geocode().never();

        let uow = TestUnitOfWork::new(MockUserRepository::new(), places);
        let service = PlaceManager::new(Arc::new(uow), Arc::new(geocoder));

        let result = service
            .update_place(place_id, Uuid::new_v4(), update_request())
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_place_regeocodes_address() {
        let owner_id = Uuid::new_v4();
        let place = place_owned_by(owner_id);
        let place_id = place.id;

        let mut places = MockPlaceRepository::new();
        places
            .expect_find_by_id()
            .returning(move |_| Ok(Some(place.clone())));
        places
            .expect_update()
            .withf(|p: &Place| p.address == "9 Side St" && p.location == Location::new(1.0, 2.0))
            .times(1)
            .returning(|_| Ok(()));

        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .with(eq("9 Side St"))
            .returning(|_| Ok(Location::new(1.0, 2.0)));

        let uow = TestUnitOfWork::new(MockUserRepository::new(), places);
        let service = PlaceManager::new(Arc::new(uow), Arc::new(geocoder));

        let updated = service
            .update_place(place_id, owner_id, update_request())
            .await
            .unwrap();
        assert_eq!(updated.title, "Bistro");
        assert_eq!(updated.image, "uploads/images/cafe.png");
    }
}
