use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChainCache;
use crate::{
  entity::{ReferralKind, referral, restaurant, user},
  prelude::*,
};

/// A referral event as submitted by a write path.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReferral {
  /// The user credited with the referral
  pub referer_id: String,
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub restaurant_id: Option<String>,
  /// Referral code or link token that carried the referral
  #[serde(default)]
  pub code: Option<String>,
}

/// Checks the shape of a referral record before anything is written.
///
/// A record must attribute to a user, a restaurant or both. Both sides set
/// means a visit referral: the referer sent this user to this restaurant.
pub fn validate(record: &NewReferral) -> Result<ReferralKind> {
  if record.referer_id.trim().is_empty() {
    return Err(Error::InvalidReferral("referer must not be empty".into()));
  }

  let user_id = record.user_id.as_deref();
  let restaurant_id = record.restaurant_id.as_deref();

  if user_id.is_some_and(|id| id.trim().is_empty())
    || restaurant_id.is_some_and(|id| id.trim().is_empty())
  {
    return Err(Error::InvalidReferral(
      "referenced ids must not be empty".into(),
    ));
  }

  if user_id == Some(record.referer_id.as_str()) {
    return Err(Error::InvalidReferral("a user cannot refer themself".into()));
  }

  match (user_id, restaurant_id) {
    (Some(_), Some(_)) => Ok(ReferralKind::Visit),
    (Some(_), None) => Ok(ReferralKind::UserJoin),
    (None, Some(_)) => Ok(ReferralKind::RestaurantOnboarding),
    (None, None) => Err(Error::InvalidReferral(
      "referral must attribute to a user or a restaurant".into(),
    )),
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSnapshot {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

impl From<&user::Model> for UserSnapshot {
  fn from(user: &user::Model) -> Self {
    Self {
      id: user.id.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantSnapshot {
  pub id: String,
  pub name: String,
}

impl From<&restaurant::Model> for RestaurantSnapshot {
  fn from(restaurant: &restaurant::Model) -> Self {
    Self { id: restaurant.id.clone(), name: restaurant.name.clone() }
  }
}

/// Referral as shown in a referer's list, with the referred parties inlined.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralView {
  pub id: String,
  pub kind: Option<ReferralKind>,
  pub code: Option<String>,
  pub created_at: DateTime,
  pub user: Option<UserSnapshot>,
  pub restaurant: Option<RestaurantSnapshot>,
}

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
  cache: Option<&'a ChainCache>,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, cache: None }
  }

  pub fn with_cache(self, cache: Option<&'a ChainCache>) -> Self {
    Self { cache, ..self }
  }

  /// Validate and store a referral event
  pub async fn create(&self, new: NewReferral) -> Result<referral::Model> {
    let kind = validate(&new)?;

    user::Entity::find_by_id(new.referer_id.as_str())
      .one(self.db)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, &new.referer_id))?;

    if let Some(user_id) = &new.user_id {
      user::Entity::find_by_id(user_id.as_str())
        .one(self.db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::User, user_id))?;
    }

    if let Some(restaurant_id) = &new.restaurant_id {
      restaurant::Entity::find_by_id(restaurant_id.as_str())
        .one(self.db)
        .await?
        .ok_or_else(|| {
          Error::not_found(EntityKind::Restaurant, restaurant_id)
        })?;
    }

    let referral = referral::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      referer_id: Set(new.referer_id),
      user_id: Set(new.user_id),
      restaurant_id: Set(new.restaurant_id),
      code: Set(new.code),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    if let (Some(cache), Some(user_id), Some(restaurant_id)) =
      (self.cache, &referral.user_id, &referral.restaurant_id)
    {
      cache.invalidate_pair(user_id, restaurant_id);
    }

    info!(
      "Recorded {:?} referral {} by {}",
      kind, referral.id, referral.referer_id
    );
    Ok(referral)
  }

  /// Latest visit referral that sent `user_id` to `restaurant_id`
  pub async fn visit(
    &self,
    user_id: &str,
    restaurant_id: &str,
  ) -> Result<Option<referral::Model>> {
    Ok(
      referral::Entity::find()
        .filter(referral::Column::UserId.eq(user_id))
        .filter(referral::Column::RestaurantId.eq(restaurant_id))
        .order_by_desc(referral::Column::CreatedAt)
        .order_by_desc(referral::Column::Id)
        .one(self.db)
        .await?,
    )
  }

  /// Referrals credited to a user, newest first
  pub async fn by_referer(
    &self,
    referer_id: &str,
  ) -> Result<Vec<ReferralView>> {
    let referrals = referral::Entity::find()
      .filter(referral::Column::RefererId.eq(referer_id))
      .order_by_desc(referral::Column::CreatedAt)
      .order_by_desc(referral::Column::Id)
      .all(self.db)
      .await?;

    let user_ids: HashSet<&str> =
      referrals.iter().filter_map(|r| r.user_id.as_deref()).collect();
    let restaurant_ids: HashSet<&str> =
      referrals.iter().filter_map(|r| r.restaurant_id.as_deref()).collect();

    let users: HashMap<String, user::Model> = user::Entity::find()
      .filter(user::Column::Id.is_in(user_ids))
      .all(self.db)
      .await?
      .into_iter()
      .map(|user| (user.id.clone(), user))
      .collect();

    let restaurants: HashMap<String, restaurant::Model> =
      restaurant::Entity::find()
        .filter(restaurant::Column::Id.is_in(restaurant_ids))
        .all(self.db)
        .await?
        .into_iter()
        .map(|restaurant| (restaurant.id.clone(), restaurant))
        .collect();

    Ok(
      referrals
        .into_iter()
        .map(|referral| ReferralView {
          kind: referral.kind(),
          user: referral
            .user_id
            .as_ref()
            .and_then(|id| users.get(id))
            .map(UserSnapshot::from),
          restaurant: referral
            .restaurant_id
            .as_ref()
            .and_then(|id| restaurants.get(id))
            .map(RestaurantSnapshot::from),
          id: referral.id,
          code: referral.code,
          created_at: referral.created_at,
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{chain::ReferralChain, test_utils::test_db};

  fn record(user: Option<&str>, restaurant: Option<&str>) -> NewReferral {
    NewReferral {
      referer_id: "u0".into(),
      user_id: user.map(Into::into),
      restaurant_id: restaurant.map(Into::into),
      code: None,
    }
  }

  #[test]
  fn test_validate_requires_a_side() {
    let result = validate(&record(None, None));
    assert!(matches!(result, Err(Error::InvalidReferral(_))));
  }

  #[test]
  fn test_validate_kinds() {
    assert_eq!(
      validate(&record(Some("u1"), None)).unwrap(),
      ReferralKind::UserJoin
    );
    assert_eq!(
      validate(&record(None, Some("r1"))).unwrap(),
      ReferralKind::RestaurantOnboarding
    );
    assert_eq!(
      validate(&record(Some("u1"), Some("r1"))).unwrap(),
      ReferralKind::Visit
    );
  }

  #[test]
  fn test_validate_rejects_self_referral() {
    let result = validate(&record(Some("u0"), Some("r1")));
    assert!(matches!(result, Err(Error::InvalidReferral(_))));
  }

  #[test]
  fn test_validate_rejects_empty_ids() {
    let result = validate(&record(Some(""), None));
    assert!(matches!(result, Err(Error::InvalidReferral(_))));

    let result = validate(&NewReferral {
      referer_id: " ".into(),
      ..record(Some("u1"), None)
    });
    assert!(matches!(result, Err(Error::InvalidReferral(_))));
  }

  #[tokio::test]
  async fn test_create_blocks_invalid_record() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;

    let result = Referral::new(&db).create(record(None, None)).await;

    assert!(matches!(result, Err(Error::InvalidReferral(_))));
    let count = referral::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
  }

  #[tokio::test]
  async fn test_create_unknown_restaurant() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;

    let result =
      Referral::new(&db).create(record(Some("u1"), Some("r404"))).await;

    assert!(matches!(
      result,
      Err(Error::NotFound { kind: EntityKind::Restaurant, .. })
    ));
  }

  #[tokio::test]
  async fn test_create_visit_invalidates_pair() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;
    test_db::restaurant(&db, "r1", None).await;

    let cache = ChainCache::new(Duration::from_secs(60));
    cache.insert("u1", "r1", ReferralChain::default(), cache.generation());

    let referral = Referral::new(&db)
      .with_cache(Some(&cache))
      .create(NewReferral {
        code: Some("TACO-42".into()),
        ..record(Some("u1"), Some("r1"))
      })
      .await
      .unwrap();

    assert_eq!(referral.kind(), Some(ReferralKind::Visit));
    assert_eq!(referral.code.as_deref(), Some("TACO-42"));
    assert!(cache.get("u1", "r1").is_none());
  }

  #[tokio::test]
  async fn test_by_referer_with_snapshots() {
    let db = test_db::setup().await;
    test_db::user(&db, "u0", None).await;
    test_db::user(&db, "u1", None).await;
    test_db::user(&db, "u9", None).await;
    test_db::restaurant(&db, "r1", None).await;

    let now = Utc::now().naive_utc();
    let day = chrono::TimeDelta::days(1);
    test_db::referral(&db, "u0", Some("u1"), None, now - day * 2).await;
    test_db::referral(&db, "u0", None, Some("r1"), now - day).await;
    test_db::referral(&db, "u0", Some("u1"), Some("r1"), now).await;
    test_db::referral(&db, "u9", Some("u1"), None, now).await;

    let views = Referral::new(&db).by_referer("u0").await.unwrap();

    assert_eq!(views.len(), 3);
    assert_eq!(views[0].kind, Some(ReferralKind::Visit));
    assert_eq!(views[1].kind, Some(ReferralKind::RestaurantOnboarding));
    assert_eq!(views[2].kind, Some(ReferralKind::UserJoin));

    let user = views[2].user.as_ref().unwrap();
    assert_eq!(user.first_name, "First u1");
    assert!(views[2].restaurant.is_none());

    let restaurant = views[1].restaurant.as_ref().unwrap();
    assert_eq!(restaurant.name, "Restaurant r1");
    assert!(views[1].user.is_none());
  }
}
