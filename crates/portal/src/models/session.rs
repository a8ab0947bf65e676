//! Session-related types.
//!
//! Types stored in the session for authentication state.

use brief_bulletin_core::Role;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::api::LoginPayload;

/// Session-stored reader identity.
///
/// Present exactly while the reader is signed in. The session cookie has no
/// max-age, so it goes away with the browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSession {
    /// Bearer token for the REST API.
    #[serde(with = "secret_string")]
    token: SecretString,
    pub role: Role,
    pub user_name: String,
}

impl CurrentSession {
    #[must_use]
    pub const fn new(token: SecretString, role: Role, user_name: String) -> Self {
        Self {
            token,
            role,
            user_name,
        }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<LoginPayload> for CurrentSession {
    fn from(payload: LoginPayload) -> Self {
        Self::new(payload.token, payload.role, payload.user_name)
    }
}

/// The session store needs the raw token; nothing else ever sees it.
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

/// Session keys.
pub mod keys {
    /// Signed-in reader ([`super::CurrentSession`]).
    pub const CURRENT_SESSION: &str = "current_session";

    /// Sign-in / OTP state machine.
    pub const LOGIN_FLOW: &str = "login_flow";

    /// Loaded home feed.
    pub const HOME_FEED: &str = "home_feed";

    /// Admin panel lists and form.
    pub const ADMIN_PANEL: &str = "admin_panel";

    /// One-shot notice for the next rendered page.
    pub const NOTICE: &str = "notice";
}
