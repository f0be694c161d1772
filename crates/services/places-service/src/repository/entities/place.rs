//! Place database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Location, Place};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub image: String,
    pub creator_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain document with its `saved` back-references.
    pub fn into_domain(self, saved: Vec<Uuid>) -> Place {
        Place {
            id: self.id,
            title: self.title,
            description: self.description,
            address: self.address,
            location: Location::new(self.longitude, self.latitude),
            image: self.image,
            creator: self.creator_id,
            saved,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
