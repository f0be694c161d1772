//! Snapshots a user keeps of places they saved (`User.savedPlaces`).

use sea_orm::entity::prelude::*;

use domain::{Location, SavedPlace};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_saved_places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub place_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub image: String,
    pub creator_id: Uuid,
    pub saved_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SavedPlace {
    fn from(model: Model) -> Self {
        SavedPlace {
            id: model.place_id,
            title: model.title,
            description: model.description,
            address: model.address,
            location: Location::new(model.longitude, model.latitude),
            image: model.image,
            creator: model.creator_id,
            saved_at: model.saved_at,
        }
    }
}
