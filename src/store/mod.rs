//! Path-addressed document store.
//!
//! Every persisted record (users, orders, notifications, blogs, courses)
//! lives in one JSON tree keyed by [`StorePath`]. Adapters implement
//! [`DocumentStore`]; services only ever talk to the trait.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;

mod memory;
mod path;
mod postgres;
pub mod tree;

pub use memory::MemoryStore;
pub use path::{StorePath, StorePathError};
pub use postgres::PgStore;

/// Capacity of the change feed before slow subscribers start lagging.
pub const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store path: {0}")]
    Path(#[from] StorePathError),

    #[error("stored value at {path} has an unexpected shape: {source}")]
    Shape {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the subtree at `path`.
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Replace the subtree at `path`. Writing `null` removes it.
    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Merge `patch` into the node at `path`; keys may be relative paths.
    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the subtree at `path`, reporting whether it existed.
    async fn remove(&self, path: &StorePath) -> Result<bool, StoreError>;

    /// Receive the path of every subsequent write.
    fn subscribe(&self) -> broadcast::Receiver<StorePath>;
}

/// Typed read of a single record.
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &StorePath,
) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Shape {
                path: path.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Read every child of a collection node. Children that fail to decode are
/// logged and skipped so one bad record cannot hide the rest.
pub async fn list_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &StorePath,
) -> Result<Vec<(String, T)>, StoreError> {
    let Some(Value::Object(children)) = store.get(path).await? else {
        return Ok(Vec::new());
    };
    let mut items = Vec::with_capacity(children.len());
    for (key, value) in children {
        match serde_json::from_value(value) {
            Ok(item) => items.push((key, item)),
            Err(err) => {
                tracing::warn!(path = %path, key = %key, error = %err, "skipping malformed record");
            }
        }
    }
    Ok(items)
}

/// Typed write of a single record.
pub async fn set_as<T: Serialize>(
    store: &dyn DocumentStore,
    path: &StorePath,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Shape {
        path: path.to_string(),
        source,
    })?;
    store.set(path, value).await
}
