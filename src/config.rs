use std::env;

use anyhow::Context;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// Lifetime of a cached referral chain, zero disables the cache
  pub chain_cache_ttl: Duration,
  pub rate_limit_per_second: u64,
  pub rate_limit_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:referdby.db?mode=rwc".into(),
      port: 3000,
      chain_cache_ttl: Duration::from_secs(5 * 60),
      rate_limit_per_second: 2,
      rate_limit_burst: 100,
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let mut config = Self::default();

    if let Ok(url) = env::var("DATABASE_URL") {
      config.database_url = url;
    }
    if let Ok(port) = env::var("PORT") {
      config.port = port.parse().context("Invalid PORT")?;
    }
    if let Ok(ttl) = env::var("CHAIN_CACHE_TTL") {
      config.chain_cache_ttl =
        humantime::parse_duration(&ttl).context("Invalid CHAIN_CACHE_TTL")?;
    }
    if let Ok(rate) = env::var("RATE_LIMIT_PER_SECOND") {
      config.rate_limit_per_second =
        rate.parse().context("Invalid RATE_LIMIT_PER_SECOND")?;
    }
    if let Ok(burst) = env::var("RATE_LIMIT_BURST") {
      config.rate_limit_burst =
        burst.parse().context("Invalid RATE_LIMIT_BURST")?;
    }

    Ok(config)
  }

  pub fn cache_enabled(&self) -> bool {
    !self.chain_cache_ttl.is_zero()
  }
}
