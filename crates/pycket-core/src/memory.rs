//! In-process key-value store with lazy TTL expiry

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{KeyValueStore, StoreConnector};

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Minimum time between two expiry sweeps triggered by writes.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Thread-safe store shared by every clone.
///
/// Runs on the tokio clock, so paused-time tests can step over expirations.
/// Expired entries are dropped when read, and a write sweeps the whole map
/// at most once per [`SWEEP_INTERVAL`].
/// Connection options are ignored: every `connect` hands out the same map.
#[derive(Clone)]
pub struct MemoryStore {
    map: Arc<DashMap<String, Entry>>,
    last_sweep: Arc<Mutex<Instant>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let start_len = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        *self.last_sweep.lock() = now;

        let count = start_len.saturating_sub(self.map.len());
        if count > 0 {
            debug!("Purged {} expired entries from memory store", count);
        }
        count
    }

    fn maybe_sweep(&self) {
        let due = self.last_sweep.lock().elapsed() >= SWEEP_INTERVAL;
        if due {
            self.purge_expired();
        }
    }

    /// Raw bytes under `key`, honouring expiry.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lookup(key).map(|value| value.to_vec())
    }

    /// Remaining time to live of `key`.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entry = self.map.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.expires_at.saturating_duration_since(now))
    }

    /// Drop every entry.
    pub fn flush(&self) {
        self.map.clear();
    }

    fn lookup(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        let entry = self.map.get(key)?;
        if entry.is_expired(now) {
            drop(entry);
            // A write may have replaced the entry since the guard was released.
            self.map.remove_if(key, |_, entry| entry.is_expired(now));
            debug!("Entry expired, removed from memory store");
            return None;
        }
        Some(entry.value.clone())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError> {
        self.maybe_sweep();
        let entry = Entry {
            value: Bytes::from(value),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.map.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }
}

impl StoreConnector for MemoryStore {
    fn connect(&self, _options: &Value) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        Ok(Arc::new(self.clone()))
    }
}
