//! Place repository: the place document and its `saved` back-references.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::place::{self, Entity as PlaceEntity};
use super::entities::place_saver::{self, Entity as PlaceSaverEntity};
use super::{not_updated_as_not_found, DbHandle};
use common::{AppError, AppResult, OptionExt};
use domain::Place;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Place repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Find place by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>>;

    /// All places created by a user, oldest first
    async fn find_by_creator(&self, creator: Uuid) -> AppResult<Vec<Place>>;

    /// Insert a new place document
    async fn insert(&self, place: &Place) -> AppResult<()>;

    /// Overwrite the editable attributes
    async fn update(&self, place: &Place) -> AppResult<()>;

    /// Record that a user saved the place; a no-op if already recorded
    async fn add_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()>;

    /// Forget that a user saved the place
    async fn remove_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()>;

    /// Drop a user from the `saved` list of every place, returning how many changed
    async fn remove_saver_everywhere(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete the place document together with its `saved` list
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed place repository.
pub struct PlaceStore<D = DatabaseConnection> {
    db: D,
}

impl<D: DbHandle> PlaceStore<D> {
    /// Create new repository instance
    pub fn new(db: D) -> Self {
        Self { db }
    }
}

async fn hydrate<C: ConnectionTrait>(db: &C, model: place::Model) -> AppResult<Place> {
    let saved = PlaceSaverEntity::find()
        .filter(place_saver::Column::PlaceId.eq(model.id))
        .order_by_asc(place_saver::Column::SavedAt)
        .order_by_asc(place_saver::Column::UserId)
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.user_id)
        .collect();

    Ok(model.into_domain(saved))
}

async fn require_place<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<place::Model> {
    PlaceEntity::find_by_id(id).one(db).await?.ok_or_not_found()
}

async fn insert_saver<C: ConnectionTrait>(db: &C, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let row = place_saver::ActiveModel {
        place_id: Set(place_id),
        user_id: Set(user_id),
        saved_at: Set(chrono::Utc::now()),
    };
    PlaceSaverEntity::insert(row).exec_without_returning(db).await?;
    Ok(())
}

#[async_trait]
impl<D: DbHandle> PlaceRepository for PlaceStore<D> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        let db = self.db.conn();
        match PlaceEntity::find_by_id(id).one(db).await? {
            Some(model) => Ok(Some(hydrate(db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_creator(&self, creator: Uuid) -> AppResult<Vec<Place>> {
        let db = self.db.conn();
        let models = PlaceEntity::find()
            .filter(place::Column::CreatorId.eq(creator))
            .order_by_asc(place::Column::CreatedAt)
            .all(db)
            .await?;

        let mut places = Vec::with_capacity(models.len());
        for model in models {
            places.push(hydrate(db, model).await?);
        }
        Ok(places)
    }

    async fn insert(&self, place: &Place) -> AppResult<()> {
        let db = self.db.conn();
        let active_model = place::ActiveModel {
            id: Set(place.id),
            title: Set(place.title.clone()),
            description: Set(place.description.clone()),
            address: Set(place.address.clone()),
            longitude: Set(place.location.longitude),
            latitude: Set(place.location.latitude),
            image: Set(place.image.clone()),
            creator_id: Set(place.creator),
            created_at: Set(place.created_at),
            updated_at: Set(place.updated_at),
        };
        PlaceEntity::insert(active_model)
            .exec_without_returning(db)
            .await?;

        for user_id in &place.saved {
            insert_saver(db, place.id, *user_id).await?;
        }
        Ok(())
    }

    async fn update(&self, place: &Place) -> AppResult<()> {
        let active_model = place::ActiveModel {
            id: Set(place.id),
            title: Set(place.title.clone()),
            description: Set(place.description.clone()),
            address: Set(place.address.clone()),
            longitude: Set(place.location.longitude),
            latitude: Set(place.location.latitude),
            image: Set(place.image.clone()),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        active_model
            .update(self.db.conn())
            .await
            .map_err(not_updated_as_not_found)?;
        Ok(())
    }

    async fn add_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let db = self.db.conn();
        require_place(db, place_id).await?;

        if PlaceSaverEntity::find_by_id((place_id, user_id))
            .one(db)
            .await?
            .is_some()
        {
            return Ok(());
        }
        insert_saver(db, place_id, user_id).await
    }

    async fn remove_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let db = self.db.conn();
        require_place(db, place_id).await?;

        PlaceSaverEntity::delete_many()
            .filter(place_saver::Column::PlaceId.eq(place_id))
            .filter(place_saver::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn remove_saver_everywhere(&self, user_id: Uuid) -> AppResult<u64> {
        let result = PlaceSaverEntity::delete_many()
            .filter(place_saver::Column::UserId.eq(user_id))
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let db = self.db.conn();

        PlaceSaverEntity::delete_many()
            .filter(place_saver::Column::PlaceId.eq(id))
            .exec(db)
            .await?;

        let result = PlaceEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
