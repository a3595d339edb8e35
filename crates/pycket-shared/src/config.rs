//! Host settings
//!
//! The session manager only ever asks the host for one namespace (the
//! key-value store options), so settings are modelled as a lookup
//! capability rather than a fixed struct.

use std::collections::HashMap;

use config::{Config, Environment, File, FileFormat};
use serde_json::{Map, Value};

use crate::constants::ENV_PREFIX;
use crate::error::AppError;

/// Read access to the host framework's settings.
pub trait SettingsReader: Send + Sync {
    /// Value stored under `namespace`, or `default` when the namespace is absent.
    fn get_option(&self, namespace: &str, default: Value) -> Value;
}

impl SettingsReader for Map<String, Value> {
    fn get_option(&self, namespace: &str, default: Value) -> Value {
        self.get(namespace).cloned().unwrap_or(default)
    }
}

impl SettingsReader for HashMap<String, Value> {
    fn get_option(&self, namespace: &str, default: Value) -> Value {
        self.get(namespace).cloned().unwrap_or(default)
    }
}

/// Settings layered from `config/default`, `config/{APP_ENV}` and
/// `PYCKET__`-prefixed environment variables.
#[derive(Debug, Clone)]
pub struct HostSettings {
    inner: Config,
}

impl HostSettings {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        tracing::debug!("Loaded host settings for environment {}", env);
        Ok(Self { inner: config })
    }

    /// Build settings from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Ok(Self { inner: config })
    }
}

impl SettingsReader for HostSettings {
    fn get_option(&self, namespace: &str, default: Value) -> Value {
        // Any config value maps onto JSON, so a failed lookup means a missing key.
        self.inner.get::<Value>(namespace).unwrap_or(default)
    }
}
