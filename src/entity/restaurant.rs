use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{referral, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub name: String,
  /// Who referred this restaurant onto the platform
  pub referer_id: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::RefererId",
    to = "user::Column::Id"
  )]
  Referer,
  #[sea_orm(has_many = "referral::Entity")]
  Referrals,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referer.def()
  }
}

impl Related<referral::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
