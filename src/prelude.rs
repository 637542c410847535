pub use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
  time::Duration,
};

pub use chrono::{NaiveDateTime as DateTime, Utc};
pub use dashmap::DashMap;
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set,
  TransactionTrait,
};
pub use tracing::{debug, error, info, trace, warn};

pub use crate::error::{EntityKind, Error, Result};
