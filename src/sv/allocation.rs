use serde::Deserialize;

use crate::{entity::points_allocation, prelude::*};

#[derive(Debug, Clone, Deserialize)]
pub struct NewAllocation {
  #[serde(rename = "type")]
  pub ty: String,
  pub percentage: f64,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "active_by_default")]
  pub is_active: bool,
}

fn active_by_default() -> bool {
  true
}

pub struct Allocation<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Allocation<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// The single active allocation for `ty`.
  ///
  /// More than one active row is reported as [`Error::AmbiguousAllocation`]
  /// instead of picking one of them.
  pub async fn active(&self, ty: &str) -> Result<points_allocation::Model> {
    let mut rows = points_allocation::Entity::find()
      .filter(points_allocation::Column::Ty.eq(ty))
      .filter(points_allocation::Column::IsActive.eq(true))
      .all(self.db)
      .await?;

    match rows.len() {
      0 => Err(Error::NoActiveAllocation(ty.into())),
      1 => rows.pop().ok_or_else(|| Error::NoActiveAllocation(ty.into())),
      count => {
        warn!("{count} active points allocations for `{ty}`");
        Err(Error::AmbiguousAllocation { ty: ty.into(), count })
      }
    }
  }

  pub async fn all(&self) -> Result<Vec<points_allocation::Model>> {
    Ok(
      points_allocation::Entity::find()
        .order_by_asc(points_allocation::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn create(
    &self,
    new: NewAllocation,
  ) -> Result<points_allocation::Model> {
    let ty = new.ty.trim();
    if ty.is_empty() {
      return Err(Error::InvalidArgs(
        "Allocation type must not be empty".into(),
      ));
    }
    if !new.percentage.is_finite() || !(0.0..=100.0).contains(&new.percentage)
    {
      return Err(Error::InvalidArgs(format!(
        "Percentage must be within 0..=100, got {}",
        new.percentage
      )));
    }

    let txn = self.db.begin().await?;

    if new.is_active {
      ensure_no_active(&txn, ty).await?;
    }

    let allocation = points_allocation::ActiveModel {
      id: NotSet,
      created_at: Set(Utc::now().naive_utc()),
      ty: Set(ty.into()),
      percentage: Set(new.percentage),
      description: Set(new.description),
      is_active: Set(new.is_active),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "Created points allocation {} for `{}`: {}%",
      allocation.id, allocation.ty, allocation.percentage
    );
    Ok(allocation)
  }

  pub async fn activate(&self, id: i32) -> Result<points_allocation::Model> {
    let txn = self.db.begin().await?;

    let allocation = points_allocation::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or_else(|| {
        Error::not_found(EntityKind::PointsAllocation, id.to_string())
      })?;

    if allocation.is_active {
      return Ok(allocation);
    }

    ensure_no_active(&txn, &allocation.ty).await?;

    let allocation = points_allocation::ActiveModel {
      is_active: Set(true),
      ..allocation.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    Ok(allocation)
  }

  /// Soft-retire an allocation, the row is kept
  pub async fn deactivate(&self, id: i32) -> Result<points_allocation::Model> {
    let allocation = points_allocation::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or_else(|| {
        Error::not_found(EntityKind::PointsAllocation, id.to_string())
      })?;

    if !allocation.is_active {
      return Ok(allocation);
    }

    let allocation = points_allocation::ActiveModel {
      is_active: Set(false),
      ..allocation.into()
    }
    .update(self.db)
    .await?;

    info!(
      "Retired points allocation {} for `{}`",
      allocation.id, allocation.ty
    );
    Ok(allocation)
  }
}

async fn ensure_no_active(db: &impl ConnectionTrait, ty: &str) -> Result<()> {
  let active = points_allocation::Entity::find()
    .filter(points_allocation::Column::Ty.eq(ty))
    .filter(points_allocation::Column::IsActive.eq(true))
    .count(db)
    .await?;

  if active > 0 {
    return Err(Error::AllocationConflict(ty.into()));
  }
  Ok(())
}
