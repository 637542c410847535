//! In-memory cache of resolved referral chains.
//!
//! A cached chain stays valid only while the data it was derived from is
//! unchanged, so every write path touching that data must call one of the
//! `invalidate_*` methods:
//!
//! - `User.referer_id` of a customer: [`ChainCache::invalidate_customer`]
//! - `Restaurant.referer_id`: [`ChainCache::invalidate_restaurant`]
//! - a visit referral for a pair: [`ChainCache::invalidate_pair`]
//!
//! Entries additionally expire after the configured TTL.

use std::{
  sync::atomic::{AtomicU64, Ordering},
  time::Instant,
};

use super::chain::ReferralChain;
use crate::prelude::*;

type Key = (String, String);

struct Entry {
  chain: ReferralChain,
  stored_at: Instant,
}

pub struct ChainCache {
  ttl: Duration,
  entries: DashMap<Key, Entry>,
  generation: AtomicU64,
}

impl ChainCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, entries: DashMap::new(), generation: AtomicU64::new(0) }
  }

  /// Snapshot to pass back to [`ChainCache::insert`] once the chain has been
  /// read from the database.
  pub fn generation(&self) -> u64 {
    self.generation.load(Ordering::Acquire)
  }

  pub fn get(
    &self,
    customer_id: &str,
    restaurant_id: &str,
  ) -> Option<ReferralChain> {
    let key = (customer_id.to_string(), restaurant_id.to_string());
    let entry = self.entries.get(&key)?;
    if entry.stored_at.elapsed() < self.ttl {
      return Some(entry.chain.clone());
    }
    drop(entry);
    self
      .entries
      .remove_if(&key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
    None
  }

  /// Stores a chain resolved while `generation` was current. Returns `false`
  /// when an invalidation happened in between and the chain was dropped.
  pub fn insert(
    &self,
    customer_id: &str,
    restaurant_id: &str,
    chain: ReferralChain,
    generation: u64,
  ) -> bool {
    if self.generation() != generation {
      return false;
    }

    let key = (customer_id.to_string(), restaurant_id.to_string());
    self
      .entries
      .insert(key.clone(), Entry { chain, stored_at: Instant::now() });

    // An invalidation may have slipped in between the check and the insert
    if self.generation() != generation {
      self.entries.remove(&key);
      return false;
    }
    true
  }

  pub fn invalidate_customer(&self, customer_id: &str) {
    self.bump();
    self.entries.retain(|(customer, _), _| customer != customer_id);
  }

  pub fn invalidate_restaurant(&self, restaurant_id: &str) {
    self.bump();
    self.entries.retain(|(_, restaurant), _| restaurant != restaurant_id);
  }

  pub fn invalidate_pair(&self, customer_id: &str, restaurant_id: &str) {
    self.bump();
    self.entries.remove(&(customer_id.to_string(), restaurant_id.to_string()));
  }

  /// Drops expired entries, returns how many were removed.
  pub fn evict_expired(&self) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
    before.saturating_sub(self.entries.len())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn bump(&self) {
    self.generation.fetch_add(1, Ordering::AcqRel);
  }
}
