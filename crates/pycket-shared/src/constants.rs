//! Session-wide constants

/// Cookie holding the session identifier.
pub const SESSION_ID_NAME: &str = "PYCKET_ID";

/// Settings namespace holding the key-value store connection options.
pub const STORE_SETTINGS_NAMESPACE: &str = "pycket_redis";

/// One day.
pub const DEFAULT_EXPIRE_SECONDS: u64 = 24 * 60 * 60;

/// Random bytes behind a freshly minted session identifier.
pub const SESSION_ID_BYTES: usize = 32;

/// Prefix for environment overrides of host settings (`PYCKET__PYCKET_REDIS__HOST`).
pub const ENV_PREFIX: &str = "PYCKET";
