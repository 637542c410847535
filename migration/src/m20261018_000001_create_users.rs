use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Users::FirstName).string().not_null())
          .col(ColumnDef::new(Users::LastName).string().not_null())
          // Null means organic signup
          .col(ColumnDef::new(Users::RefererId).string().null())
          .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_users_referer")
          .table(Users::Table)
          .col(Users::RefererId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  FirstName,
  LastName,
  RefererId,
  CreatedAt,
}
