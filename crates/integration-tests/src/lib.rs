//! Integration test harness for the Brief Bulletin portal.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brief-bulletin-integration-tests
//! ```
//!
//! Every [`TestApp`] serves the full portal router on an ephemeral port,
//! backed by its own `mockito` server standing in for the REST API. The HTTP
//! client keeps cookies, so the session survives across requests and
//! redirects are followed the way a browser would.
//!
//! # Test Categories
//!
//! - `login_flow` - sign-in, sign-up, OTP and password reset
//! - `home_feed` - feed paging, language switch, article page, comments
//! - `admin_panel` - moderation tabs, admin creation, move to draft

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use brief_bulletin_portal::config::{GuestCredentials, PortalConfig};
use brief_bulletin_portal::middleware::SessionCache;
use brief_bulletin_portal::state::AppState;
use mockito::{Matcher, Mock, ServerGuard};
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::{Value, json};

pub use mockito;
pub use serde_json;

/// Source of distinct client addresses. The sign-in limiter is keyed on the
/// forwarded client IP, so every request gets its own.
static NEXT_CLIENT: AtomicU32 = AtomicU32::new(1);

fn next_client_ip() -> String {
    let n = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
    Ipv4Addr::from(0x0a00_0000 | (n & 0x00ff_ffff)).to_string()
}

/// Wrap `payload` in a successful API envelope.
#[must_use]
pub fn ok_envelope(payload: &Value) -> String {
    json!({
        "statusCode": 200,
        "isSuccess": true,
        "serviceMessage": null,
        "payload": payload,
    })
    .to_string()
}

/// A failure envelope with `status` and an optional message.
#[must_use]
pub fn error_envelope(status: u16, message: Option<&str>) -> String {
    json!({
        "statusCode": status,
        "isSuccess": false,
        "serviceMessage": message,
        "payload": null,
    })
    .to_string()
}

/// A published article as the API sends it.
#[must_use]
pub fn article(id: i32, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "summary": format!("Summary of {title}"),
        "content": format!("Full text of {title}"),
        "featured_image": null,
        "category_id": 1,
        "status": "published",
        "published_at": "2024-03-01T09:30:00Z",
        "views_count": 4,
        "source_url": "https://source.example.com/story",
        "created_at": "2024-03-01T09:00:00Z",
    })
}

/// A comment from the moderation queue.
#[must_use]
pub fn pending_comment(id: i32, author: &str, content: &str) -> Value {
    json!({
        "comment_id": id,
        "article_id": 1,
        "user_name": author,
        "user_email": "reader@example.com",
        "content": content,
        "created_at": "2024-03-02T10:00:00Z",
        "status": "pending",
    })
}

/// Portal under test plus its fake API.
pub struct TestApp {
    pub api: ServerGuard,
    pub address: SocketAddr,
    pub client: Client,
    /// The portal's session store.
    pub sessions: SessionCache,
    mocks: Vec<Mock>,
}

impl TestApp {
    /// Start a portal with default settings.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start a portal, adjusting its configuration first.
    pub async fn spawn_with(configure: impl FnOnce(&mut PortalConfig)) -> Self {
        let api = mockito::Server::new_async().await;

        let mut config = PortalConfig::for_api(&api.url()).expect("mock API URL is valid");
        config.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../portal/static");
        configure(&mut config);

        let state = AppState::new(config).expect("failed to build app state");
        let sessions = state.sessions().clone();
        let app = brief_bulletin_portal::app(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("failed to bind test listener");
        let address = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("portal server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build HTTP client");

        Self {
            api,
            address,
            client,
            sessions,
            mocks: Vec::new(),
        }
    }

    /// Start a portal with "Continue as guest" enabled.
    pub async fn spawn_with_guest(login: &str, password: &str) -> Self {
        let guest = GuestCredentials {
            login: login.to_owned(),
            password: SecretString::from(password.to_owned()),
        };
        Self::spawn_with(move |config| config.guest = Some(guest)).await
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Submit a form, as a fresh client address.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("x-forwarded-for", next_client_ip())
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET as a first-time visitor: no cookies sent or kept.
    pub async fn get_as_visitor(&self, path: &str) -> Response {
        Client::new()
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Submit an empty form, giving up after `timeout`.
    pub async fn post_within(&self, path: &str, timeout: Duration) -> reqwest::Result<Response> {
        self.client
            .post(self.url(path))
            .header("x-forwarded-for", next_client_ip())
            .timeout(timeout)
            .send()
            .await
    }

    /// Submit a form without fields.
    pub async fn post(&self, path: &str) -> Response {
        self.post_form(path, &[]).await
    }

    /// Keep `mock` registered for the lifetime of the app.
    pub fn keep(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }

    /// `POST api/auth/login` for `login` answers with a token and `role`.
    pub async fn mock_login(&mut self, login: &str, user_name: &str, role: &str) -> Mock {
        self.api
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::PartialJson(json!({ "login": login })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok_envelope(&json!({
                "user_id": 1,
                "user_name": user_name,
                "email": login,
                "role": role,
                "token": format!("token-{user_name}"),
            })))
            .create_async()
            .await
    }

    /// `GET api/category` with a single "World" category.
    pub async fn mock_categories(&mut self) {
        let mock = self
            .api
            .mock("GET", "/api/category")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok_envelope(&json!([{ "id": 1, "name": "World", "slug": "world" }])))
            .create_async()
            .await;
        self.keep(mock);
    }

    /// `GET api/articles` for `page` in `lang`.
    pub async fn mock_articles(&mut self, page: u32, lang: &str, articles: &Value) -> Mock {
        self.api
            .mock("GET", "/api/articles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), page.to_string()),
                Matcher::UrlEncoded("lang".into(), lang.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok_envelope(articles))
            .create_async()
            .await
    }

    /// Sign in as `login` with `role` and land on a feed holding `articles`.
    pub async fn sign_in_as(&mut self, login: &str, user_name: &str, role: &str, articles: &Value) {
        let login_mock = self.mock_login(login, user_name, role).await;
        self.keep(login_mock);
        self.mock_categories().await;
        let feed = self.mock_articles(1, "en", articles).await;
        self.keep(feed);

        let response = self
            .post_form("/auth/login", &[("login", login), ("password", "correct-horse")])
            .await;
        assert_eq!(response.url().path(), "/home", "sign-in did not reach the feed");
    }

    /// Sign in as a regular reader.
    pub async fn sign_in_reader(&mut self, articles: &Value) {
        self.sign_in_as("reader@example.com", "Reader", "USER", articles)
            .await;
    }

    /// Sign in as an admin.
    pub async fn sign_in_admin(&mut self, articles: &Value) {
        self.sign_in_as("admin@example.com", "Editor", "ADMIN", articles)
            .await;
    }
}
