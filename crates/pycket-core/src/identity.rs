//! Session identity
//!
//! A client is identified only by the `PYCKET_ID` secure cookie. The value
//! is minted once, on first contact, and reused verbatim afterwards.

use rand::RngCore;
use tracing::{debug, info};

use pycket_shared::constants::{SESSION_ID_BYTES, SESSION_ID_NAME};

use crate::error::{BoxError, SessionError};

/// Secure-cookie access provided by the host handler.
///
/// Setting a cookie takes `&self`; hosts keep outgoing cookies behind
/// interior mutability for the duration of the request.
#[cfg_attr(test, mockall::automock)]
pub trait CookieJar {
    fn get_secure_cookie(&self, name: &str) -> Result<Option<String>, BoxError>;

    fn set_secure_cookie(
        &self,
        name: &str,
        value: &str,
        expire_days: Option<u32>,
    ) -> Result<(), BoxError>;
}

/// Fresh hex-encoded identifier from the thread-local CSPRNG.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Resolve the session identifier for the client behind `jar`.
///
/// Writes the cookie (with no client-side expiry) only when the client
/// did not send one.
pub fn resolve_session_id<J: CookieJar + ?Sized>(jar: &J) -> Result<String, SessionError> {
    if let Some(session_id) = jar
        .get_secure_cookie(SESSION_ID_NAME)
        .map_err(SessionError::Cookie)?
    {
        debug!("Reusing session {} from cookie", short_id(&session_id));
        return Ok(session_id);
    }

    let session_id = generate_session_id();
    jar.set_secure_cookie(SESSION_ID_NAME, &session_id, None)
        .map_err(SessionError::Cookie)?;
    info!("Issued new session {}", short_id(&session_id));
    Ok(session_id)
}

/// Log-safe prefix of a session identifier.
pub(crate) fn short_id(session_id: &str) -> String {
    session_id.chars().take(8).collect()
}
