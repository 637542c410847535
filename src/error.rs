use std::fmt;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Kind of stored entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
  User,
  Restaurant,
  PointsAllocation,
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      EntityKind::User => "user",
      EntityKind::Restaurant => "restaurant",
      EntityKind::PointsAllocation => "points allocation",
    })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{kind} `{id}` not found")]
  NotFound { kind: EntityKind, id: String },
  #[error("invalid referral: {0}")]
  InvalidReferral(String),
  #[error("no active points allocation for type `{0}`")]
  NoActiveAllocation(String),
  #[error("{count} active points allocations for type `{ty}`")]
  AmbiguousAllocation { ty: String, count: usize },
  #[error("an active points allocation for type `{0}` already exists")]
  AllocationConflict(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("database error: {0}")]
  Db(#[from] DbErr),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
    Error::NotFound { kind, id: id.into() }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::NotFound { .. } | Error::NoActiveAllocation(_) => {
        StatusCode::NOT_FOUND
      }
      Error::InvalidReferral(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::AllocationConflict(_) => StatusCode::CONFLICT,
      Error::AmbiguousAllocation { .. } | Error::Db(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Serialize)]
pub struct Status {
  pub success: bool,
  pub msg: Option<String>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let msg = match &self {
      Error::Db(err) => {
        tracing::error!("database error: {err}");
        "Internal error".to_string()
      }
      Error::AmbiguousAllocation { .. } => {
        tracing::error!("{self}");
        self.to_string()
      }
      _ => self.to_string(),
    };
    (status, Json(Status { success: false, msg: Some(msg) })).into_response()
  }
}
