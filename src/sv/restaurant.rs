use serde::Deserialize;
use uuid::Uuid;

use super::ChainCache;
use crate::{
  entity::{restaurant, user},
  prelude::*,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewRestaurant {
  #[serde(default)]
  pub id: Option<String>,
  pub name: String,
  #[serde(default)]
  pub referer_id: Option<String>,
}

pub struct Restaurant<'a> {
  db: &'a DatabaseConnection,
  cache: Option<&'a ChainCache>,
}

impl<'a> Restaurant<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, cache: None }
  }

  pub fn with_cache(self, cache: Option<&'a ChainCache>) -> Self {
    Self { cache, ..self }
  }

  pub async fn create(&self, new: NewRestaurant) -> Result<restaurant::Model> {
    let name = new.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidArgs("Restaurant name must not be empty".into()));
    }

    let id = match new.id {
      Some(id) if id.trim().is_empty() => {
        return Err(Error::InvalidArgs(
          "Restaurant id must not be empty".into(),
        ));
      }
      Some(id) => id,
      None => Uuid::new_v4().to_string(),
    };

    let txn = self.db.begin().await?;

    if restaurant::Entity::find_by_id(id.as_str()).one(&txn).await?.is_some()
    {
      return Err(Error::InvalidArgs(format!(
        "Restaurant `{id}` already exists"
      )));
    }

    if let Some(referer_id) = &new.referer_id {
      user::Entity::find_by_id(referer_id.as_str())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::User, referer_id))?;
    }

    let restaurant = restaurant::ActiveModel {
      id: Set(id),
      name: Set(name.into()),
      referer_id: Set(new.referer_id),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "Onboarded restaurant {} (referer: {:?})",
      restaurant.id, restaurant.referer_id
    );
    Ok(restaurant)
  }

  pub async fn by_id(&self, id: &str) -> Result<restaurant::Model> {
    restaurant::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Restaurant, id))
  }

  /// Set who brought the restaurant onto the platform, allowed once
  pub async fn set_referer(
    &self,
    id: &str,
    referer_id: &str,
  ) -> Result<restaurant::Model> {
    let txn = self.db.begin().await?;

    let restaurant = restaurant::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Restaurant, id))?;

    if restaurant.referer_id.is_some() {
      return Err(Error::InvalidArgs(
        "Restaurant already has a referrer".into(),
      ));
    }

    user::Entity::find_by_id(referer_id)
      .one(&txn)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, referer_id))?;

    let restaurant = restaurant::ActiveModel {
      referer_id: Set(Some(referer_id.into())),
      ..restaurant.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    if let Some(cache) = self.cache {
      cache.invalidate_restaurant(id);
    }

    debug!("Restaurant {id} referred by {referer_id}");
    Ok(restaurant)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{chain::ReferralChain, test_utils::test_db};

  #[tokio::test]
  async fn test_create_referred_restaurant() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;

    let restaurant = Restaurant::new(&db)
      .create(NewRestaurant {
        id: Some("r1".into()),
        name: "  Chez Panisse ".into(),
        referer_id: Some("u0".into()),
      })
      .await
      .unwrap();

    assert_eq!(restaurant.name, "Chez Panisse");
    assert_eq!(restaurant.referer_id.as_deref(), Some("u0"));
  }

  #[tokio::test]
  async fn test_create_rejects_empty_name() {
    let db = test_db::setup().await;

    let result = Restaurant::new(&db)
      .create(NewRestaurant { id: None, name: " ".into(), referer_id: None })
      .await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn test_by_id_not_found() {
    let db = test_db::setup().await;

    let result = Restaurant::new(&db).by_id("r404").await;

    assert!(matches!(
      result,
      Err(Error::NotFound { kind: EntityKind::Restaurant, .. })
    ));
  }

  #[tokio::test]
  async fn test_set_referer_invalidates_cached_chains() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::restaurant(&db, "r1", None).await;

    let cache = ChainCache::new(Duration::from_secs(60));
    cache.insert("u1", "r1", ReferralChain::default(), cache.generation());
    cache.insert("u1", "r2", ReferralChain::default(), cache.generation());

    let restaurant = Restaurant::new(&db)
      .with_cache(Some(&cache))
      .set_referer("r1", "u0")
      .await
      .unwrap();

    assert_eq!(restaurant.referer_id.as_deref(), Some("u0"));
    assert!(cache.get("u1", "r1").is_none());
    assert!(cache.get("u1", "r2").is_some());
  }

  #[tokio::test]
  async fn test_set_referer_twice() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;
    test_db::restaurant(&db, "r1", Some("u0")).await;

    let result = Restaurant::new(&db).set_referer("r1", "u1").await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }
}
