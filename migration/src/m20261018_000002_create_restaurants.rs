use sea_orm_migration::prelude::*;

use super::m20261018_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Restaurants::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Restaurants::Id).string().not_null().primary_key(),
          )
          .col(ColumnDef::new(Restaurants::Name).string().not_null())
          .col(ColumnDef::new(Restaurants::RefererId).string().null())
          .col(ColumnDef::new(Restaurants::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_restaurants_referer")
              .from(Restaurants::Table, Restaurants::RefererId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Restaurants::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Restaurants {
  Table,
  Id,
  Name,
  RefererId,
  CreatedAt,
}
