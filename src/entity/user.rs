use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::referral;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  /// Who referred this user into the app, `None` for organic signups
  pub referer_id: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "referral::Entity")]
  Referrals,
}

impl Related<referral::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
