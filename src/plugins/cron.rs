use std::sync::Arc;

use async_trait::async_trait;

use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Evicts expired referral chains from the cache.
pub struct GC;

#[async_trait]
impl Plugin for GC {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    if app.chains.is_none() {
      info!("Chain cache disabled, GC not needed");
      return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
      interval.tick().await;
      app.gc_chains();
    }
  }
}
