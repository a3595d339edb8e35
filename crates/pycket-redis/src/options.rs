//! Connection options read from the `pycket_redis` settings namespace

use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use serde::Deserialize;
use serde_json::Value;

use pycket_core::StoreError;

/// Options for the Redis client. Every field is optional; an empty object
/// means a local server on the default port, database 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedisOptions {
    /// Full connection URL; overrides the discrete fields below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_connections: Option<usize>,
}

impl Default for RedisOptions {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".into(),
            port: 6379,
            db: 0,
            username: None,
            password: None,
            max_connections: None,
        }
    }
}

impl RedisOptions {
    pub fn from_value(options: &Value) -> Result<Self, StoreError> {
        serde_json::from_value(options.clone())
            .map_err(|e| StoreError::InvalidOptions(e.to_string()))
    }

    /// Connection URL. Credentials are inserted as given; use `url` for
    /// passwords containing URL-reserved characters.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };
        format!("redis://{}{}:{}/{}", auth, self.host, self.port, self.db)
    }

    /// Build a connection pool. No connection is opened until first use.
    pub fn create_pool(&self) -> Result<Pool, StoreError> {
        let mut config = Config::from_url(self.connection_url());
        config.pool = self.max_connections.map(PoolConfig::new);
        config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::InvalidOptions(e.to_string()))
    }
}
