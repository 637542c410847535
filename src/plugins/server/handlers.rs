use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use crate::{
  entity::{points_allocation, referral, restaurant, user},
  prelude::*,
  state::AppState,
  sv::{
    self, allocation::NewAllocation, referral::NewReferral,
    referral::ReferralView, restaurant::NewRestaurant, user::NewUser,
  },
};

type App = State<Arc<AppState>>;

#[derive(Deserialize)]
pub struct SetReferer {
  referer_id: String,
}

#[derive(Deserialize)]
pub struct ReferralsQuery {
  referer_id: String,
}

pub async fn health() -> &'static str {
  "OK"
}

pub async fn create_user(
  State(app): App,
  Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<user::Model>)> {
  let user = sv::User::new(&app.db).create(req).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

pub async fn user(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<user::Model>> {
  Ok(Json(sv::User::new(&app.db).by_id(&id).await?))
}

pub async fn set_user_referer(
  State(app): App,
  Path(id): Path<String>,
  Json(req): Json<SetReferer>,
) -> Result<Json<user::Model>> {
  let user = sv::User::new(&app.db)
    .with_cache(app.chains.as_ref())
    .set_referer(&id, &req.referer_id)
    .await?;
  Ok(Json(user))
}

pub async fn referred_users(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Vec<user::Model>>> {
  Ok(Json(sv::User::new(&app.db).referred_by(&id).await?))
}

pub async fn create_restaurant(
  State(app): App,
  Json(req): Json<NewRestaurant>,
) -> Result<(StatusCode, Json<restaurant::Model>)> {
  let restaurant = sv::Restaurant::new(&app.db).create(req).await?;
  Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn restaurant(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<restaurant::Model>> {
  Ok(Json(sv::Restaurant::new(&app.db).by_id(&id).await?))
}

pub async fn set_restaurant_referer(
  State(app): App,
  Path(id): Path<String>,
  Json(req): Json<SetReferer>,
) -> Result<Json<restaurant::Model>> {
  let restaurant = sv::Restaurant::new(&app.db)
    .with_cache(app.chains.as_ref())
    .set_referer(&id, &req.referer_id)
    .await?;
  Ok(Json(restaurant))
}

pub async fn chain(
  State(app): App,
  Path((customer_id, restaurant_id)): Path<(String, String)>,
) -> Result<Json<sv::ReferralChain>> {
  let chain = sv::Chain::new(&app.db)
    .with_cache(app.chains.as_ref())
    .resolve(&customer_id, &restaurant_id)
    .await?;
  Ok(Json(chain))
}

pub async fn create_referral(
  State(app): App,
  Json(req): Json<NewReferral>,
) -> Result<(StatusCode, Json<referral::Model>)> {
  let referral = sv::Referral::new(&app.db)
    .with_cache(app.chains.as_ref())
    .create(req)
    .await?;
  Ok((StatusCode::CREATED, Json(referral)))
}

pub async fn referrals(
  State(app): App,
  Query(query): Query<ReferralsQuery>,
) -> Result<Json<Vec<ReferralView>>> {
  Ok(Json(sv::Referral::new(&app.db).by_referer(&query.referer_id).await?))
}

pub async fn allocations(
  State(app): App,
) -> Result<Json<Vec<points_allocation::Model>>> {
  Ok(Json(sv::Allocation::new(&app.db).all().await?))
}

pub async fn create_allocation(
  State(app): App,
  Json(req): Json<NewAllocation>,
) -> Result<(StatusCode, Json<points_allocation::Model>)> {
  let allocation = sv::Allocation::new(&app.db).create(req).await?;
  Ok((StatusCode::CREATED, Json(allocation)))
}

pub async fn active_allocation(
  State(app): App,
  Path(ty): Path<String>,
) -> Result<Json<points_allocation::Model>> {
  Ok(Json(sv::Allocation::new(&app.db).active(&ty).await?))
}

pub async fn activate_allocation(
  State(app): App,
  Path(id): Path<i32>,
) -> Result<Json<points_allocation::Model>> {
  Ok(Json(sv::Allocation::new(&app.db).activate(id).await?))
}

pub async fn deactivate_allocation(
  State(app): App,
  Path(id): Path<i32>,
) -> Result<Json<points_allocation::Model>> {
  Ok(Json(sv::Allocation::new(&app.db).deactivate(id).await?))
}
