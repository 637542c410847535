use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Configured reward share for one category of referral.
///
/// Rows are soft-retired through `is_active`, never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "points_allocations")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub created_at: DateTime,
  #[sea_orm(column_name = "type")]
  #[serde(rename = "type")]
  pub ty: String,
  pub percentage: f64,
  pub description: Option<String>,
  pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
