//! HTTP plumbing shared by the auth and content endpoints.

use std::sync::Arc;
use std::time::Duration;

use brief_bulletin_core::Category;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::{ApiEnvelope, ApiError};
use crate::config::PortalConfig;

/// Category list lifetime in the cache.
const CATEGORY_TTL: Duration = Duration::from_secs(600);

/// Client for the Brief Bulletin REST API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation).
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(concat!("brief-bulletin-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base: config.api_url.clone(),
                categories,
            }),
        })
    }

    pub(super) fn category_cache(&self) -> &Cache<(), Arc<Vec<Category>>> {
        &self.inner.categories
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path, query)?;
        let builder = self.inner.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// `GET path?query`.
    pub(super) async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&SecretString>,
    ) -> Result<ApiEnvelope, ApiError> {
        let builder = self.request(Method::GET, path, query, token)?;
        self.execute(path, builder).await
    }

    /// `POST path` with a JSON body.
    pub(super) async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<ApiEnvelope, ApiError> {
        let builder = self.request(Method::POST, path, &[], token)?.json(body);
        self.execute(path, builder).await
    }

    async fn execute(&self, path: &str, builder: RequestBuilder) -> Result<ApiEnvelope, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error bodies are not always JSON (proxies, panics upstream).
        let envelope = match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                warn!(
                    path,
                    error = %e,
                    body = %body.chars().take(200).collect::<String>(),
                    "API returned a non-JSON success body"
                );
                return Err(ApiError::Parse(e));
            }
            Err(_) => ApiEnvelope::default(),
        };
        let message = envelope.message().map(str::to_owned);

        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized { message }),
            StatusCode::FORBIDDEN => return Err(ApiError::Unverified { message }),
            s if !s.is_success() => {
                warn!(path, status = s.as_u16(), message = ?message, "API returned error status");
                return Err(ApiError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        if !envelope.succeeded() {
            debug!(path, status_code = envelope.status_code, "API rejected request");
            return Err(ApiError::Rejected {
                status: envelope.status_code,
                message,
            });
        }

        Ok(envelope)
    }
}
