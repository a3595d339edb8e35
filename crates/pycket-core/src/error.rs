//! Session errors

use thiserror::Error;

/// Error type returned by host-provided capabilities such as the cookie jar.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Invalid store options: {0}")]
    InvalidOptions(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Key not found in session: {0}")]
    KeyNotFound(String),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Session value could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cookie error: {0}")]
    Cookie(#[source] BoxError),
}
