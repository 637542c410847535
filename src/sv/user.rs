use serde::Deserialize;
use uuid::Uuid;

use super::ChainCache;
use crate::{entity::user, prelude::*};

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  /// Generated when absent
  #[serde(default)]
  pub id: Option<String>,
  pub first_name: String,
  pub last_name: String,
  #[serde(default)]
  pub referer_id: Option<String>,
}

pub struct User<'a> {
  db: &'a DatabaseConnection,
  cache: Option<&'a ChainCache>,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, cache: None }
  }

  pub fn with_cache(self, cache: Option<&'a ChainCache>) -> Self {
    Self { cache, ..self }
  }

  pub async fn create(&self, new: NewUser) -> Result<user::Model> {
    let first_name = new.first_name.trim();
    let last_name = new.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
      return Err(Error::InvalidArgs("User name must not be empty".into()));
    }

    let id = match new.id {
      Some(id) if id.trim().is_empty() => {
        return Err(Error::InvalidArgs("User id must not be empty".into()));
      }
      Some(id) => id,
      None => Uuid::new_v4().to_string(),
    };

    let txn = self.db.begin().await?;

    if user::Entity::find_by_id(id.as_str()).one(&txn).await?.is_some() {
      return Err(Error::InvalidArgs(format!("User `{id}` already exists")));
    }

    if let Some(referer_id) = &new.referer_id {
      if *referer_id == id {
        return Err(Error::InvalidArgs("Cannot refer yourself".into()));
      }
      user::Entity::find_by_id(referer_id.as_str())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::User, referer_id))?;
    }

    let user = user::ActiveModel {
      id: Set(id),
      first_name: Set(first_name.into()),
      last_name: Set(last_name.into()),
      referer_id: Set(new.referer_id),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("Registered user {} (referer: {:?})", user.id, user.referer_id);
    Ok(user)
  }

  pub async fn by_id(&self, id: &str) -> Result<user::Model> {
    user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, id))
  }

  /// Set the referrer for a user, allowed once
  pub async fn set_referer(
    &self,
    id: &str,
    referer_id: &str,
  ) -> Result<user::Model> {
    // Cannot refer yourself
    if id == referer_id {
      return Err(Error::InvalidArgs("Cannot refer yourself".into()));
    }

    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, id))?;

    if user.referer_id.is_some() {
      return Err(Error::InvalidArgs("User already has a referrer".into()));
    }

    user::Entity::find_by_id(referer_id)
      .one(&txn)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, referer_id))?;

    let user = user::ActiveModel {
      referer_id: Set(Some(referer_id.into())),
      ..user.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    if let Some(cache) = self.cache {
      cache.invalidate_customer(id);
    }

    debug!("User {id} referred by {referer_id}");
    Ok(user)
  }

  pub async fn referred_by(
    &self,
    referer_id: &str,
  ) -> Result<Vec<user::Model>> {
    Ok(
      user::Entity::find()
        .filter(user::Column::RefererId.eq(referer_id))
        .order_by_asc(user::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{chain::ReferralChain, test_utils::test_db};

  fn new_user(id: &str, referer_id: Option<&str>) -> NewUser {
    NewUser {
      id: Some(id.into()),
      first_name: "Ada".into(),
      last_name: "Lovelace".into(),
      referer_id: referer_id.map(Into::into),
    }
  }

  #[tokio::test]
  async fn test_create_organic_user() {
    let db = test_db::setup().await;

    let user = User::new(&db).create(new_user("u1", None)).await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(user.referer_id, None);
  }

  #[tokio::test]
  async fn test_create_generates_id() {
    let db = test_db::setup().await;

    let user = User::new(&db)
      .create(NewUser { id: None, ..new_user("", None) })
      .await
      .unwrap();

    assert!(Uuid::parse_str(&user.id).is_ok());
  }

  #[tokio::test]
  async fn test_create_with_unknown_referer() {
    let db = test_db::setup().await;

    let result = User::new(&db).create(new_user("u1", Some("ghost"))).await;

    assert!(matches!(
      result,
      Err(Error::NotFound { kind: EntityKind::User, ref id }) if id == "ghost"
    ));
  }

  #[tokio::test]
  async fn test_create_duplicate() {
    let db = test_db::setup().await;
    test_db::user(&db, "u1", None).await;

    let result = User::new(&db).create(new_user("u1", None)).await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn test_set_referer_once() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;
    test_db::user(&db, "u2", None).await;

    let user = User::new(&db).set_referer("u1", "u0").await.unwrap();
    assert_eq!(user.referer_id.as_deref(), Some("u0"));

    let result = User::new(&db).set_referer("u1", "u2").await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));

    let user = User::new(&db).by_id("u1").await.unwrap();
    assert_eq!(user.referer_id.as_deref(), Some("u0"));
  }

  #[tokio::test]
  async fn test_cannot_refer_yourself() {
    let db = test_db::setup().await;
    test_db::user(&db, "u1", None).await;

    let result = User::new(&db).set_referer("u1", "u1").await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn test_set_referer_invalidates_cached_chains() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;

    let cache = ChainCache::new(Duration::from_secs(60));
    cache.insert("u1", "r1", ReferralChain::default(), cache.generation());

    User::new(&db)
      .with_cache(Some(&cache))
      .set_referer("u1", "u0")
      .await
      .unwrap();

    assert!(cache.get("u1", "r1").is_none());
  }

  #[tokio::test]
  async fn test_referred_by() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", Some("u0")).await;
    test_db::user(&db, "u2", Some("u0")).await;
    test_db::user(&db, "u3", None).await;

    let referred = User::new(&db).referred_by("u0").await.unwrap();

    let ids: Vec<_> = referred.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"u1") && ids.contains(&"u2"));
  }
}
