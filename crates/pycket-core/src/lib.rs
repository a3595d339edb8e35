//! # Pycket Core
//! 
//! Session identity, the session manager and the key-value store port.
//!
//! A host handler exposes its secure-cookie jar and settings; the manager
//! resolves the client's `PYCKET_ID`, then keeps one JSON blob per session
//! in the store with a sliding expiration window.

pub mod error;
pub mod identity;
pub mod store;
pub mod memory;
pub mod manager;
pub mod mixin;

#[cfg(test)]
mod test;

pub use error::{BoxError, SessionError, StoreError};
pub use identity::{generate_session_id, resolve_session_id, CookieJar};
pub use manager::{SessionManager, SessionMap};
pub use memory::MemoryStore;
pub use mixin::{SessionHandler, SessionMixin};
pub use store::{KeyValueStore, StoreConnector};
