use serde::{Deserialize, Serialize};

use super::{ChainCache, Referral};
use crate::{
  entity::{restaurant, user},
  prelude::*,
};

/// Who gets credit for a customer showing up at a restaurant.
///
/// The three ids are independent: any of them may be absent regardless of
/// the others. Always derived from current data, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralChain {
  /// Who brought the customer into the app
  pub user_referer_id: Option<String>,
  /// Who brought the restaurant onto the platform
  pub restaurant_referer_id: Option<String>,
  /// Who sent this customer to this restaurant
  pub visit_referer_id: Option<String>,
}

pub struct Chain<'a> {
  db: &'a DatabaseConnection,
  cache: Option<&'a ChainCache>,
}

impl<'a> Chain<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, cache: None }
  }

  pub fn with_cache(self, cache: Option<&'a ChainCache>) -> Self {
    Self { cache, ..self }
  }

  pub async fn resolve(
    &self,
    customer_id: &str,
    restaurant_id: &str,
  ) -> Result<ReferralChain> {
    if customer_id.trim().is_empty() || restaurant_id.trim().is_empty() {
      return Err(Error::InvalidArgs(
        "Customer and restaurant ids must not be empty".into(),
      ));
    }

    let generation = match self.cache {
      Some(cache) => {
        if let Some(chain) = cache.get(customer_id, restaurant_id) {
          trace!("Chain cache hit for ({customer_id}, {restaurant_id})");
          return Ok(chain);
        }
        Some(cache.generation())
      }
      None => None,
    };

    let chain = self.derive(customer_id, restaurant_id).await?;

    if let (Some(cache), Some(generation)) = (self.cache, generation) {
      cache.insert(customer_id, restaurant_id, chain.clone(), generation);
    }

    Ok(chain)
  }

  async fn derive(
    &self,
    customer_id: &str,
    restaurant_id: &str,
  ) -> Result<ReferralChain> {
    let customer = user::Entity::find_by_id(customer_id)
      .one(self.db)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::User, customer_id))?;

    let restaurant = restaurant::Entity::find_by_id(restaurant_id)
      .one(self.db)
      .await?
      .ok_or_else(|| {
        Error::not_found(EntityKind::Restaurant, restaurant_id)
      })?;

    let visit =
      Referral::new(self.db).visit(customer_id, restaurant_id).await?;

    Ok(ReferralChain {
      user_referer_id: customer.referer_id,
      restaurant_referer_id: restaurant.referer_id,
      visit_referer_id: visit.map(|referral| referral.referer_id),
    })
  }
}
