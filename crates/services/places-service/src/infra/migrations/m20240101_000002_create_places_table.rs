//! Migration: Create places table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Places::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Places::Title).string().not_null())
                    .col(ColumnDef::new(Places::Description).text().not_null())
                    .col(ColumnDef::new(Places::Address).string().not_null())
                    .col(ColumnDef::new(Places::Longitude).double().not_null())
                    .col(ColumnDef::new(Places::Latitude).double().not_null())
                    .col(ColumnDef::new(Places::Image).string().not_null())
                    .col(ColumnDef::new(Places::CreatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Places::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Places::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_places_creator")
                            .from(Places::Table, Places::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_places_creator_id")
                    .table(Places::Table)
                    .col(Places::CreatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
    Title,
    Description,
    Address,
    Longitude,
    Latitude,
    Image,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
