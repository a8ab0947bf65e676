//! One-shot notices shown as a modal on the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// CSS modifier for the dialog.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice--success",
            Self::Info => "notice--info",
            Self::Warning => "notice--warning",
            Self::Error => "notice--error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_owned(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    #[must_use]
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    #[must_use]
    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    #[must_use]
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    /// Store the notice for the next page. Replaces any unseen notice.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn flash(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::NOTICE, self).await
    }

    /// Remove and return the pending notice, if any.
    ///
    /// A broken session only loses the notice.
    pub async fn take(session: &Session) -> Option<Self> {
        match session.remove::<Self>(session_keys::NOTICE).await {
            Ok(notice) => notice,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read notice from session");
                None
            }
        }
    }
}
