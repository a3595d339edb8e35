//! Redis implementation of the key-value store port

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::{redis, Connection, Pool};
use serde_json::Value;
use tracing::{debug, info};

use pycket_core::{KeyValueStore, StoreConnector, StoreError};

use crate::options::RedisOptions;

fn backend<E: Display>(err: E) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Session blobs stored as plain Redis strings with `EX` expiry.
///
/// Timeouts and reconnects are whatever the pool and `redis` client do by
/// default; nothing is retried here.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<Connection, StoreError> {
        self.pool.get().await.map_err(backend)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

/// Hands out [`RedisStore`]s, sharing one pool per distinct option set so
/// per-request managers do not open fresh connections.
#[derive(Clone, Default)]
pub struct RedisConnector {
    pools: Arc<DashMap<RedisOptions, Pool>>,
}

impl RedisConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct pools created so far.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    fn pool_for(&self, options: RedisOptions) -> Result<Pool, StoreError> {
        if let Some(pool) = self.pools.get(&options) {
            return Ok(pool.clone());
        }

        let pool = options.create_pool()?;
        info!(
            "Created Redis pool for {}:{} db {}",
            options.host, options.port, options.db
        );
        Ok(self.pools.entry(options).or_insert(pool).clone())
    }
}

impl StoreConnector for RedisConnector {
    fn connect(&self, options: &Value) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let options = RedisOptions::from_value(options)?;
        let pool = self.pool_for(options)?;
        debug!("Connected session store to Redis pool");
        Ok(Arc::new(RedisStore::new(pool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pycket_core::{CookieJar, SessionError, SessionManager};
    use pycket_shared::constants::STORE_SETTINGS_NAMESPACE;
    use serde_json::{json, Map};
    use std::time::Duration;

    struct FixedCookie(&'static str);

    impl CookieJar for FixedCookie {
        fn get_secure_cookie(&self, _name: &str) -> Result<Option<String>, pycket_core::BoxError> {
            Ok(Some(self.0.to_string()))
        }

        fn set_secure_cookie(
            &self,
            _name: &str,
            _value: &str,
            _expire_days: Option<u32>,
        ) -> Result<(), pycket_core::BoxError> {
            Ok(())
        }
    }

    fn live_settings() -> Map<String, Value> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".into());
        let mut settings = Map::new();
        settings.insert(STORE_SETTINGS_NAMESPACE.into(), json!({ "url": url }));
        settings
    }

    #[test]
    fn test_connector_reuses_pool_for_same_options() {
        let connector = RedisConnector::new();

        connector.connect(&json!({})).unwrap();
        connector.connect(&json!({})).unwrap();
        assert_eq!(connector.pool_count(), 1);

        connector.connect(&json!({ "db": 3 })).unwrap();
        assert_eq!(connector.pool_count(), 2);
    }

    #[test]
    fn test_connector_rejects_bad_options() {
        let connector = RedisConnector::new();
        assert!(matches!(
            connector.connect(&json!({ "port": -1 })),
            Err(StoreError::InvalidOptions(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_store_error() {
        let connector = RedisConnector::new();
        let client = connector.connect(&json!({ "port": 1 })).unwrap();
        let manager = SessionManager::with_client("session-id", client);

        assert!(matches!(
            manager.get::<String>("foo").await,
            Err(SessionError::Store(StoreError::Backend(_)))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server (REDIS_URL)"]
    async fn test_live_round_trip() {
        let connector = RedisConnector::new();
        let manager =
            SessionManager::new(&FixedCookie("pycket-live-test"), &live_settings(), &connector)
                .unwrap();

        manager.set("some-object", &json!({ "foo": "bar" })).await.unwrap();
        manager.set("some-object2", &json!({ "foo2": "bar2" })).await.unwrap();
        manager.delete("some-object").await.unwrap();

        assert_eq!(manager.keys().await.unwrap(), vec!["some-object2".to_string()]);
        let value: Value = manager.item("some-object2").await.unwrap();
        assert_eq!(value["foo2"], "bar2");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server (REDIS_URL)"]
    async fn test_live_expiration() {
        let connector = RedisConnector::new();
        let mut manager =
            SessionManager::new(&FixedCookie("pycket-live-ttl"), &live_settings(), &connector)
                .unwrap();
        manager.set_expire_seconds(1);

        manager.set("foo", "bar").await.unwrap();
        assert_eq!(manager.get::<String>("foo").await.unwrap().as_deref(), Some("bar"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(manager.get::<String>("foo").await.unwrap(), None);
    }
}
