use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{restaurant, user};

/// What a referral record attributes, derived from which sides are present.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralKind {
  /// Someone brought a user into the app
  UserJoin,
  /// Someone brought a restaurant onto the platform
  RestaurantOnboarding,
  /// Someone sent a customer to visit a restaurant
  Visit,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub referer_id: String,
  pub user_id: Option<String>,
  pub restaurant_id: Option<String>,
  pub code: Option<String>,
  pub created_at: DateTime,
}

impl Model {
  /// `None` only for rows that bypassed the write path.
  pub fn kind(&self) -> Option<ReferralKind> {
    match (&self.user_id, &self.restaurant_id) {
      (Some(_), Some(_)) => Some(ReferralKind::Visit),
      (Some(_), None) => Some(ReferralKind::UserJoin),
      (None, Some(_)) => Some(ReferralKind::RestaurantOnboarding),
      (None, None) => None,
    }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id"
  )]
  User,
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::RefererId",
    to = "user::Column::Id"
  )]
  Referer,
  #[sea_orm(
    belongs_to = "restaurant::Entity",
    from = "Column::RestaurantId",
    to = "restaurant::Column::Id"
  )]
  Restaurant,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<restaurant::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Restaurant.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
