use sea_orm_migration::prelude::*;

use super::{
  m20261018_000001_create_users::Users,
  m20261018_000002_create_restaurants::Restaurants,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Referrals::Table)
          .if_not_exists()
          .col(ColumnDef::new(Referrals::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Referrals::RefererId).string().not_null())
          .col(ColumnDef::new(Referrals::UserId).string().null())
          .col(ColumnDef::new(Referrals::RestaurantId).string().null())
          .col(ColumnDef::new(Referrals::Code).string().null())
          .col(ColumnDef::new(Referrals::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_referer")
              .from(Referrals::Table, Referrals::RefererId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_user")
              .from(Referrals::Table, Referrals::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_restaurant")
              .from(Referrals::Table, Referrals::RestaurantId)
              .to(Restaurants::Table, Restaurants::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_referrals_referer")
          .table(Referrals::Table)
          .col(Referrals::RefererId)
          .to_owned(),
      )
      .await?;

    // Visit lookups go by (user, restaurant)
    manager
      .create_index(
        Index::create()
          .name("idx_referrals_visit")
          .table(Referrals::Table)
          .col(Referrals::UserId)
          .col(Referrals::RestaurantId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Referrals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Referrals {
  Table,
  Id,
  RefererId,
  UserId,
  RestaurantId,
  Code,
  CreatedAt,
}
