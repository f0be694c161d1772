//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models. Each
//! list held by a domain document is stored as its own link table.

pub mod place;
pub mod place_saver;
pub mod saved_place;
pub mod user;
pub mod user_place;

#[allow(unused_imports)]
pub use place::{ActiveModel as PlaceActiveModel, Entity as PlaceEntity, Model as PlaceModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
