use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PointsAllocations::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PointsAllocations::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(PointsAllocations::CreatedAt).date_time().not_null(),
          )
          .col(ColumnDef::new(PointsAllocations::Type).string().not_null())
          .col(ColumnDef::new(PointsAllocations::Percentage).double().not_null())
          .col(ColumnDef::new(PointsAllocations::Description).string().null())
          .col(
            ColumnDef::new(PointsAllocations::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_points_allocations_type")
          .table(PointsAllocations::Table)
          .col(PointsAllocations::Type)
          .col(PointsAllocations::IsActive)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PointsAllocations::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PointsAllocations {
  Table,
  Id,
  CreatedAt,
  Type,
  Percentage,
  Description,
  IsActive,
}
