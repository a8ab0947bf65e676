//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::PortalConfig;
use crate::middleware::SessionCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Per-reader state lives in the
/// session store, never directly here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    api: ApiClient,
    sessions: SessionCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sessions: SessionCache::default(),
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionCache {
        &self.inner.sessions
    }
}
