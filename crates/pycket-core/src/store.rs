//! Key-value store port
//!
//! The session manager needs nothing beyond get / set-with-TTL / delete on
//! string keys; expiry is enforced by the store itself.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Raw value under `key`; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Builds a store client from the host's store options object.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, options: &Value) -> Result<Arc<dyn KeyValueStore>, StoreError>;
}
