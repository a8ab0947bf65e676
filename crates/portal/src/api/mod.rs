//! Brief Bulletin REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every response is wrapped in an
//!   [`ApiEnvelope`] (`statusCode`, `isSuccess`, `serviceMessage`, `payload`)
//! - The bearer token is passed in by the caller on each content call; the
//!   client holds no per-reader state
//! - The category list is cached in memory via `moka` (10 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use brief_bulletin_portal::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//! let login = api.login("reader@example.com", &password).await?;
//! let articles = api.articles(&login.token, &request).await?;
//! ```

mod auth;
mod client;
mod content;
mod envelope;

pub use auth::{LoginPayload, NewUser};
pub use client::ApiClient;
pub use envelope::ApiEnvelope;

use thiserror::Error;

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// 401: the bearer token is missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized { message: Option<String> },

    /// 403: on login this means the account still needs OTP verification.
    #[error("Forbidden: {}", message.as_deref().unwrap_or("account not verified"))]
    Unverified { message: Option<String> },

    /// Any other non-2xx status.
    #[error("API error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    /// 2xx response whose envelope reports failure.
    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
}

impl ApiError {
    /// The server-supplied `serviceMessage`, when there was one.
    #[must_use]
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Unverified { message }
            | Self::Api { message, .. }
            | Self::Rejected { message, .. } => message.as_deref(),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// Text to show a reader: the server's message, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.service_message().unwrap_or(fallback).to_owned()
    }

    /// Whether the reader's token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether a login was refused because the account needs OTP
    /// verification. The API signals this with HTTP 403 or, on some
    /// deployments, a 2xx envelope carrying `statusCode: 403`.
    #[must_use]
    pub const fn is_unverified(&self) -> bool {
        matches!(
            self,
            Self::Unverified { .. } | Self::Rejected { status: 403, .. }
        )
    }

    /// Whether the request never produced an API answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_) | Self::Url(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_prefers_server_text() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("Article already published".into()),
        };
        assert_eq!(err.service_message(), Some("Article already published"));
        assert_eq!(err.user_message("Failed"), "Article already published");

        let silent = ApiError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(silent.user_message("Failed to approve article"), "Failed to approve article");
    }

    #[test]
    fn test_classification() {
        assert!(ApiError::Unauthorized { message: None }.is_unauthorized());
        assert!(!ApiError::Unverified { message: None }.is_unauthorized());
        assert!(ApiError::Unverified { message: None }.is_unverified());
        assert!(
            ApiError::Rejected {
                status: 403,
                message: None
            }
            .is_unverified()
        );
        let parse = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(ApiError::from(parse).is_transport());
    }
}
