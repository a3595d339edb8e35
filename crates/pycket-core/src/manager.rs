//! Session manager
//!
//! One JSON object per session id lives in the key-value store. Every write
//! reads the whole object, changes one field and writes the whole object
//! back with a fresh TTL; reads never touch the TTL.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use pycket_shared::constants::{DEFAULT_EXPIRE_SECONDS, STORE_SETTINGS_NAMESPACE};
use pycket_shared::SettingsReader;

use crate::error::SessionError;
use crate::identity::{resolve_session_id, short_id, CookieJar};
use crate::store::{KeyValueStore, StoreConnector};

/// Decoded session contents.
pub type SessionMap = Map<String, Value>;

/// Per-request access to one client's session.
///
/// Managers are not shared between requests and hold no locks. Writes are a
/// read-modify-write of the whole blob, so two managers writing different
/// names under the same session id concurrently can lose one of the updates:
/// whichever save lands last wins.
pub struct SessionManager {
    session_id: String,
    client: Arc<dyn KeyValueStore>,
    expire_seconds: u64,
}

impl SessionManager {
    /// Resolve the client's session id, then connect to the store using the
    /// `pycket_redis` settings namespace (an empty object when unset).
    pub fn new<C: CookieJar + ?Sized>(
        cookies: &C,
        settings: &dyn SettingsReader,
        connector: &dyn StoreConnector,
    ) -> Result<Self, SessionError> {
        let session_id = resolve_session_id(cookies)?;
        Self::for_session(session_id, settings, connector)
    }

    /// Connect an already resolved session id to the store configured under
    /// the `pycket_redis` settings namespace.
    pub fn for_session(
        session_id: impl Into<String>,
        settings: &dyn SettingsReader,
        connector: &dyn StoreConnector,
    ) -> Result<Self, SessionError> {
        let options = settings.get_option(STORE_SETTINGS_NAMESPACE, Value::Object(Map::new()));
        let client = connector.connect(&options)?;
        Ok(Self::with_client(session_id, client))
    }

    /// Bind an already resolved session id to a store client.
    pub fn with_client(session_id: impl Into<String>, client: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session_id: session_id.into(),
            client,
            expire_seconds: DEFAULT_EXPIRE_SECONDS,
        }
    }

    pub fn with_expire_seconds(mut self, expire_seconds: u64) -> Self {
        self.set_expire_seconds(expire_seconds);
        self
    }

    /// TTL applied on subsequent writes. Stores reject a zero TTL, so the
    /// window is at least one second.
    pub fn set_expire_seconds(&mut self, expire_seconds: u64) {
        self.expire_seconds = expire_seconds.max(1);
    }

    pub fn expire_seconds(&self) -> u64 {
        self.expire_seconds
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Value stored under `name`, or `None` when the key or the whole
    /// session is absent.
    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, SessionError> {
        let mut session = self.load().await?;
        session
            .remove(name)
            .map(|value| serde_json::from_value(value).map_err(SessionError::Corrupt))
            .transpose()
    }

    /// Value stored under `name`, or `default` when absent.
    pub async fn get_or<T: DeserializeOwned>(
        &self,
        name: &str,
        default: T,
    ) -> Result<T, SessionError> {
        Ok(self.get(name).await?.unwrap_or(default))
    }

    /// Item-style access: an absent key is an error.
    pub async fn item<T: DeserializeOwned>(&self, name: &str) -> Result<T, SessionError> {
        self.get(name)
            .await?
            .ok_or_else(|| SessionError::KeyNotFound(name.to_string()))
    }

    /// Store `value` under `name`, keeping every other key, and restart the
    /// expiration window.
    ///
    /// Not atomic against other managers on the same session id (see the
    /// type docs).
    pub async fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value).map_err(SessionError::Serialize)?;
        let mut session = self.load().await?;
        session.insert(name.to_string(), value);
        self.save(&session).await
    }

    /// Item-style assignment, same as [`SessionManager::set`].
    pub async fn set_item<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), SessionError> {
        self.set(name, value).await
    }

    /// Remove `name` if present. The session is rewritten, and its TTL
    /// restarted, either way.
    pub async fn delete(&self, name: &str) -> Result<(), SessionError> {
        let mut session = self.load().await?;
        session.remove(name);
        self.save(&session).await
    }

    pub async fn contains(&self, name: &str) -> Result<bool, SessionError> {
        Ok(self.load().await?.contains_key(name))
    }

    /// Names currently stored, in no particular order.
    pub async fn keys(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.load().await?.into_iter().map(|(name, _)| name).collect())
    }

    async fn load(&self) -> Result<SessionMap, SessionError> {
        match self.client.get(&self.session_id).await? {
            Some(raw) => {
                let session: SessionMap =
                    serde_json::from_slice(&raw).map_err(SessionError::Corrupt)?;
                debug!(
                    "Loaded session {} ({} keys)",
                    short_id(&self.session_id),
                    session.len()
                );
                Ok(session)
            }
            None => Ok(SessionMap::new()),
        }
    }

    async fn save(&self, session: &SessionMap) -> Result<(), SessionError> {
        let raw = serde_json::to_vec(session).map_err(SessionError::Serialize)?;
        self.client
            .set(&self.session_id, raw, self.expire_seconds)
            .await?;
        debug!(
            "Saved session {} ({} keys, ttl {}s)",
            short_id(&self.session_id),
            session.len(),
            self.expire_seconds
        );
        Ok(())
    }
}
