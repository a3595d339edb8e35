//! Shared test doubles


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use once_cell::sync::OnceCell;

use serde_json::{Map, Value};

use pycket_shared::SettingsReader;

use crate::error::BoxError;
use crate::identity::CookieJar;
use crate::mixin::SessionHandler;

mockall::mock! {
    pub Settings {}

    impl SettingsReader for Settings {
        fn get_option(&self, namespace: &str, default: Value) -> Value;
    }
}

/// Handler double: serves a fixed incoming cookie and records outgoing ones.
pub struct StubHandler {
    cookie: Option<String>,
    writes: Mutex<Vec<(String, String, Option<u32>)>>,
    fail_writes: AtomicBool,
    session_id: OnceCell<String>,
    pub settings: Map<String, Value>,
}

impl StubHandler {
    /// Client without a session cookie.
    pub fn new() -> Self {
        Self {
            cookie: None,
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            session_id: OnceCell::new(),
            settings: Map::new(),
        }
    }

    pub fn with_cookie(session_id: &str) -> Self {
        Self {
            cookie: Some(session_id.to_string()),
            ..Self::new()
        }
    }

    /// Make outgoing cookie writes fail until switched back.
    pub fn fail_cookie_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn cookie_writes(&self) -> Vec<(String, String, Option<u32>)> {
        self.writes.lock().unwrap().clone()
    }
}

impl CookieJar for StubHandler {
    fn get_secure_cookie(&self, _name: &str) -> Result<Option<String>, BoxError> {
        Ok(self.cookie.clone())
    }

    fn set_secure_cookie(
        &self,
        name: &str,
        value: &str,
        expire_days: Option<u32>,
    ) -> Result<(), BoxError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("response already committed".into());
        }
        self.writes
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string(), expire_days));
        Ok(())
    }
}

impl SessionHandler for StubHandler {
    fn settings(&self) -> &dyn SettingsReader {
        &self.settings
    }

    fn session_slot(&self) -> &OnceCell<String> {
        &self.session_id
    }
}
