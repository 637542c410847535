use crate::{config::Config, prelude::*, sv::ChainCache};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub chains: Option<ChainCache>,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(config.database_url.as_str()).await?;
    migration::Migrator::up(&db, None).await?;
    info!("Database ready at {}", config.database_url);
    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    let chains = if config.cache_enabled() {
      Some(ChainCache::new(config.chain_cache_ttl))
    } else {
      warn!("Referral chain cache disabled");
      None
    };
    Self { db, config, chains }
  }

  pub fn gc_chains(&self) {
    if let Some(chains) = &self.chains {
      let evicted = chains.evict_expired();
      if evicted > 0 {
        debug!(
          "Evicted {evicted} expired referral chains, {} left",
          chains.len()
        );
      }
    }
  }
}
