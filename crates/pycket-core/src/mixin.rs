//! Handler integration
//!
//! A host handler that can read/write secure cookies and expose its
//! settings gets a `session()` accessor for free.
//!
//! The incoming cookie does not change during a request, so the id minted
//! for a new client is kept on the handler; later `session()` calls reuse it
//! instead of issuing another cookie.

use once_cell::sync::OnceCell;

use pycket_shared::SettingsReader;

use crate::error::SessionError;
use crate::identity::{resolve_session_id, CookieJar};
use crate::manager::SessionManager;
use crate::store::StoreConnector;

pub trait SessionHandler: CookieJar {
    fn settings(&self) -> &dyn SettingsReader;

    /// Request-scoped slot for the resolved session id.
    fn session_slot(&self) -> &OnceCell<String>;
}

pub trait SessionMixin {
    /// Session manager bound to this handler's client.
    fn session(&self, connector: &dyn StoreConnector) -> Result<SessionManager, SessionError>;
}

impl<H: SessionHandler + ?Sized> SessionMixin for H {
    fn session(&self, connector: &dyn StoreConnector) -> Result<SessionManager, SessionError> {
        let session_id = self
            .session_slot()
            .get_or_try_init(|| resolve_session_id(self))?;
        SessionManager::for_session(session_id.clone(), self.settings(), connector)
    }
}
