//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{DbBackend, Schema};

  use crate::{entity::*, prelude::*};

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    // Create user table
    let stmt = schema.create_table_from_entity(user::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create restaurant table
    let stmt = schema.create_table_from_entity(restaurant::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create referral table
    let stmt = schema.create_table_from_entity(referral::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create points_allocation table
    let stmt = schema.create_table_from_entity(points_allocation::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  pub async fn user(
    db: &DatabaseConnection,
    id: &str,
    referer_id: Option<&str>,
  ) -> user::Model {
    user::ActiveModel {
      id: Set(id.into()),
      first_name: Set(format!("First {id}")),
      last_name: Set(format!("Last {id}")),
      referer_id: Set(referer_id.map(Into::into)),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn restaurant(
    db: &DatabaseConnection,
    id: &str,
    referer_id: Option<&str>,
  ) -> restaurant::Model {
    restaurant::ActiveModel {
      id: Set(id.into()),
      name: Set(format!("Restaurant {id}")),
      referer_id: Set(referer_id.map(Into::into)),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  /// Inserts a referral row directly, skipping validation
  pub async fn referral(
    db: &DatabaseConnection,
    referer_id: &str,
    user_id: Option<&str>,
    restaurant_id: Option<&str>,
    created_at: DateTime,
  ) -> referral::Model {
    referral::ActiveModel {
      id: Set(uuid::Uuid::new_v4().to_string()),
      referer_id: Set(referer_id.into()),
      user_id: Set(user_id.map(Into::into)),
      restaurant_id: Set(restaurant_id.map(Into::into)),
      code: Set(None),
      created_at: Set(created_at),
    }
    .insert(db)
    .await
    .unwrap()
  }

  /// Inserts an allocation row directly, skipping the conflict check
  pub async fn allocation(
    db: &DatabaseConnection,
    ty: &str,
    percentage: f64,
    is_active: bool,
  ) -> points_allocation::Model {
    points_allocation::ActiveModel {
      id: NotSet,
      created_at: Set(Utc::now().naive_utc()),
      ty: Set(ty.into()),
      percentage: Set(percentage),
      description: Set(None),
      is_active: Set(is_active),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
