//! User repository: the user document and the lists it carries.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::saved_place::{self, Entity as SavedPlaceEntity};
use super::entities::user::{self, Entity as UserEntity};
use super::entities::user_place::{self, Entity as UserPlaceEntity};
use super::{not_updated_as_not_found, unique_email_violation, DbHandle};
use common::{AppError, AppResult, OptionExt};
use domain::{SavedPlace, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// List mutations address the owning user by id and fail with `NotFound`
/// when that user does not exist. Adding an entry that is already present
/// and removing one that is absent are no-ops.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List all users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Ids of users holding a snapshot of the place
    async fn find_saving(&self, place_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Insert a new user document
    async fn insert(&self, user: &User) -> AppResult<()>;

    /// Overwrite name, email, password hash and image
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Append a place to the ownership list
    async fn push_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()>;

    /// Remove a place from the ownership list
    async fn pull_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()>;

    /// Store a snapshot in the saved list
    async fn push_saved(&self, user_id: Uuid, snapshot: &SavedPlace) -> AppResult<()>;

    /// Remove the snapshot of a place from the saved list
    async fn pull_saved(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()>;

    /// Remove the snapshot of a place from every user, returning how many held one
    async fn pull_saved_everywhere(&self, place_id: Uuid) -> AppResult<u64>;

    /// Delete the user document
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed user repository.
///
/// `UserStore<DatabaseConnection>` runs on the pool; `UserStore<&DatabaseTransaction>`
/// runs inside a unit of work.
pub struct UserStore<D = DatabaseConnection> {
    db: D,
}

impl<D: DbHandle> UserStore<D> {
    /// Create new repository instance
    pub fn new(db: D) -> Self {
        Self { db }
    }
}

async fn hydrate<C: ConnectionTrait>(db: &C, model: user::Model) -> AppResult<User> {
    let places = UserPlaceEntity::find()
        .filter(user_place::Column::UserId.eq(model.id))
        .order_by_asc(user_place::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.place_id)
        .collect();

    let saved = SavedPlaceEntity::find()
        .filter(saved_place::Column::UserId.eq(model.id))
        .order_by_asc(saved_place::Column::SavedAt)
        .order_by_asc(saved_place::Column::PlaceId)
        .all(db)
        .await?
        .into_iter()
        .map(SavedPlace::from)
        .collect();

    Ok(model.into_domain(places, saved))
}

async fn require_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<user::Model> {
    UserEntity::find_by_id(id).one(db).await?.ok_or_not_found()
}

#[async_trait]
impl<D: DbHandle> UserRepository for UserStore<D> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let db = self.db.conn();
        match UserEntity::find_by_id(id).one(db).await? {
            Some(model) => Ok(Some(hydrate(db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let db = self.db.conn();
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;

        match result {
            Some(model) => Ok(Some(hydrate(db, model).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let db = self.db.conn();
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(db)
            .await?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(hydrate(db, model).await?);
        }
        Ok(users)
    }

    async fn find_saving(&self, place_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = SavedPlaceEntity::find()
            .filter(saved_place::Column::PlaceId.eq(place_id))
            .order_by_asc(saved_place::Column::SavedAt)
            .all(self.db.conn())
            .await?;

        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let db = self.db.conn();
        let active_model = user::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            image: Set(user.image.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        UserEntity::insert(active_model)
            .exec_without_returning(db)
            .await
            .map_err(unique_email_violation)?;

        for (position, place_id) in user.places.iter().enumerate() {
            insert_place_link(db, user.id, *place_id, position as i64).await?;
        }
        for snapshot in &user.saved_places {
            insert_snapshot(db, user.id, snapshot).await?;
        }
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let active_model = user::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            image: Set(user.image.clone()),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        active_model
            .update(self.db.conn())
            .await
            .map_err(|e| match not_updated_as_not_found(e) {
                AppError::Database(db_err) => unique_email_violation(db_err),
                other => other,
            })?;
        Ok(())
    }

    async fn push_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let db = self.db.conn();
        require_user(db, user_id).await?;

        let existing = UserPlaceEntity::find()
            .filter(user_place::Column::UserId.eq(user_id))
            .order_by_desc(user_place::Column::Position)
            .all(db)
            .await?;
        if existing.iter().any(|link| link.place_id == place_id) {
            return Ok(());
        }

        let next = existing.first().map(|link| link.position + 1).unwrap_or(0);
        insert_place_link(db, user_id, place_id, next).await
    }

    async fn pull_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let db = self.db.conn();
        require_user(db, user_id).await?;

        UserPlaceEntity::delete_many()
            .filter(user_place::Column::UserId.eq(user_id))
            .filter(user_place::Column::PlaceId.eq(place_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn push_saved(&self, user_id: Uuid, snapshot: &SavedPlace) -> AppResult<()> {
        let db = self.db.conn();
        require_user(db, user_id).await?;

        let existing = SavedPlaceEntity::find_by_id((user_id, snapshot.id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        insert_snapshot(db, user_id, snapshot).await
    }

    async fn pull_saved(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let db = self.db.conn();
        require_user(db, user_id).await?;

        SavedPlaceEntity::delete_many()
            .filter(saved_place::Column::UserId.eq(user_id))
            .filter(saved_place::Column::PlaceId.eq(place_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn pull_saved_everywhere(&self, place_id: Uuid) -> AppResult<u64> {
        let result = SavedPlaceEntity::delete_many()
            .filter(saved_place::Column::PlaceId.eq(place_id))
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let db = self.db.conn();

        UserPlaceEntity::delete_many()
            .filter(user_place::Column::UserId.eq(id))
            .exec(db)
            .await?;
        SavedPlaceEntity::delete_many()
            .filter(saved_place::Column::UserId.eq(id))
            .exec(db)
            .await?;

        let result = UserEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

async fn insert_place_link<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    place_id: Uuid,
    position: i64,
) -> AppResult<()> {
    let link = user_place::ActiveModel {
        user_id: Set(user_id),
        place_id: Set(place_id),
        position: Set(position),
    };
    UserPlaceEntity::insert(link).exec_without_returning(db).await?;
    Ok(())
}

async fn insert_snapshot<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    snapshot: &SavedPlace,
) -> AppResult<()> {
    let row = saved_place::ActiveModel {
        user_id: Set(user_id),
        place_id: Set(snapshot.id),
        title: Set(snapshot.title.clone()),
        description: Set(snapshot.description.clone()),
        address: Set(snapshot.address.clone()),
        longitude: Set(snapshot.location.longitude),
        latitude: Set(snapshot.location.latitude),
        image: Set(snapshot.image.clone()),
        creator_id: Set(snapshot.creator),
        saved_at: Set(snapshot.saved_at),
    };
    SavedPlaceEntity::insert(row).exec_without_returning(db).await?;
    Ok(())
}
