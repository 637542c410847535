mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/users", post(handlers::create_user))
    .route("/api/users/{id}", get(handlers::user))
    .route("/api/users/{id}/referer", put(handlers::set_user_referer))
    .route("/api/users/{id}/referred", get(handlers::referred_users))
    .route("/api/restaurants", post(handlers::create_restaurant))
    .route("/api/restaurants/{id}", get(handlers::restaurant))
    .route(
      "/api/restaurants/{id}/referer",
      put(handlers::set_restaurant_referer),
    )
    .route("/api/chain/{customer_id}/{restaurant_id}", get(handlers::chain))
    .route(
      "/api/referrals",
      get(handlers::referrals).post(handlers::create_referral),
    )
    .route(
      "/api/allocations",
      get(handlers::allocations).post(handlers::create_allocation),
    )
    .route("/api/allocations/active/{ty}", get(handlers::active_allocation))
    .route(
      "/api/allocations/{id}/activate",
      post(handlers::activate_allocation),
    )
    .route(
      "/api/allocations/{id}/deactivate",
      post(handlers::deactivate_allocation),
    )
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(app.config.rate_limit_per_second)
        .burst_size(app.config.rate_limit_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = router(app)
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP Server listening on {addr}");

    axum::serve(listener, router).await.context("Server error")
  }
}
