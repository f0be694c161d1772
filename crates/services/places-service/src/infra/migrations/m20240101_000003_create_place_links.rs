//! Migration: Create the list tables that link users and places.
//!
//! A list belongs to the document that carries it: rows go away with their
//! owner, but never with the document they point at.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // User.places
        manager
            .create_table(
                Table::create()
                    .table(UserPlaces::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserPlaces::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserPlaces::PlaceId).uuid().not_null())
                    .col(ColumnDef::new(UserPlaces::Position).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserPlaces::UserId)
                            .col(UserPlaces::PlaceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_places_user")
                            .from(UserPlaces::Table, UserPlaces::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // User.savedPlaces
        manager
            .create_table(
                Table::create()
                    .table(UserSavedPlaces::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserSavedPlaces::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::PlaceId).uuid().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Title).string().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Description).text().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Address).string().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Longitude).double().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Latitude).double().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::Image).string().not_null())
                    .col(ColumnDef::new(UserSavedPlaces::CreatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserSavedPlaces::SavedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserSavedPlaces::UserId)
                            .col(UserSavedPlaces::PlaceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_saved_places_user")
                            .from(UserSavedPlaces::Table, UserSavedPlaces::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_saved_places_place_id")
                    .table(UserSavedPlaces::Table)
                    .col(UserSavedPlaces::PlaceId)
                    .to_owned(),
            )
            .await?;

        // Place.saved
        manager
            .create_table(
                Table::create()
                    .table(PlaceSavers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlaceSavers::PlaceId).uuid().not_null())
                    .col(ColumnDef::new(PlaceSavers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlaceSavers::SavedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PlaceSavers::PlaceId)
                            .col(PlaceSavers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_savers_place")
                            .from(PlaceSavers::Table, PlaceSavers::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_place_savers_user_id")
                    .table(PlaceSavers::Table)
                    .col(PlaceSavers::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaceSavers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSavedPlaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserPlaces::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserPlaces {
    Table,
    UserId,
    PlaceId,
    Position,
}

#[derive(Iden)]
enum UserSavedPlaces {
    Table,
    UserId,
    PlaceId,
    Title,
    Description,
    Address,
    Longitude,
    Latitude,
    Image,
    CreatorId,
    SavedAt,
}

#[derive(Iden)]
enum PlaceSavers {
    Table,
    PlaceId,
    UserId,
    SavedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
}
