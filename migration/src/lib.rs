pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_users;
mod m20261018_000002_create_restaurants;
mod m20261018_000003_create_referrals;
mod m20261018_000004_create_points_allocations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261018_000001_create_users::Migration),
      Box::new(m20261018_000002_create_restaurants::Migration),
      Box::new(m20261018_000003_create_referrals::Migration),
      Box::new(m20261018_000004_create_points_allocations::Migration),
    ]
  }
}
