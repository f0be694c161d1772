//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{SavedPlace, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub image: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain document from the row and its list tables.
    pub fn into_domain(self, places: Vec<Uuid>, saved_places: Vec<SavedPlace>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            image: self.image,
            places,
            saved_places,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
