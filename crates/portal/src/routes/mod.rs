//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /home or /auth/login
//! GET  /health                 - Health check
//!
//! # Sign-in area (POSTs are rate limited)
//! GET  /auth/login             - Sign-in form
//! POST /auth/login             - Sign in
//! POST /auth/guest             - Sign in with the configured guest account
//! GET  /auth/signup            - Sign-up form
//! POST /auth/signup            - Create account, mails a code
//! GET  /auth/otp               - Code entry
//! POST /auth/otp               - Verify code
//! POST /auth/otp/resend        - Mail a fresh code once the countdown ran out
//! GET  /auth/forgot-password   - Ask for a reset code
//! POST /auth/forgot-password   - Mail a reset code
//! GET  /auth/reset-password    - New password form
//! POST /auth/reset-password    - Store the new password
//! POST /auth/back              - "Back" link of the flow
//! POST /auth/logout            - Sign out
//!
//! # Reading (requires a session)
//! GET  /home                   - Article feed
//! POST /home/more              - Load the next page
//! POST /home/language          - Switch news language
//! GET  /articles/{id}          - Article with comments
//! POST /articles/{id}/comments - Post a comment
//! GET  /articles/{id}/draft    - "Move to Draft?" confirmation (admin)
//! POST /articles/{id}/draft    - Move to draft (admin)
//!
//! # Admin panel (role ADMIN)
//! GET  /admin                          - Redirect to /admin/drafts
//! GET  /admin/drafts                   - Drafts awaiting approval
//! POST /admin/drafts/{id}/publish      - Approve a draft
//! GET  /admin/comments                 - Comments awaiting approval
//! POST /admin/comments/{id}/activate   - Approve a comment
//! GET  /admin/comments/{id}/archive    - "Archive comment?" confirmation
//! POST /admin/comments/{id}/archive    - Archive a comment
//! GET  /admin/create-admin             - New admin form
//! POST /admin/create-admin             - Create admin account
//! POST /admin/create-admin/reset       - Clear the form
//! ```

pub mod admin;
pub mod articles;
pub mod auth;
pub mod home;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::filters;
use crate::middleware::{OptionalSession, RateLimiterLayer};
use crate::models::{CurrentSession, Notice};
use crate::state::AppState;

/// Shared page chrome: the header (reader name, admin link) and the one-shot
/// notice dialog.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub user_name: Option<String>,
    pub is_admin: bool,
    pub notice: Option<Notice>,
}

impl Chrome {
    #[must_use]
    pub fn new(current: Option<&CurrentSession>, notice: Option<Notice>) -> Self {
        Self {
            user_name: current.map(|c| c.user_name.clone()),
            is_admin: current.is_some_and(CurrentSession::is_admin),
            notice,
        }
    }

    /// Chrome carrying the pending flash notice, which is consumed.
    pub async fn load(session: &Session, current: Option<&CurrentSession>) -> Self {
        Self::new(current, Notice::take(session).await)
    }

    /// Chrome showing `notice` now. Any pending flash notice is consumed so
    /// it cannot surface later on an unrelated page.
    pub async fn showing(
        session: &Session,
        current: Option<&CurrentSession>,
        notice: Notice,
    ) -> Self {
        Self::load(session, current).await.with_notice(notice)
    }

    /// Show `notice` now instead of whatever was pending.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Yes/cancel page standing in for a confirmation dialog. The confirm
/// button posts to `action`.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub chrome: Chrome,
    pub title: &'static str,
    pub message: &'static str,
    pub action: String,
    pub confirm_label: &'static str,
    pub cancel_href: String,
}

/// Create the sign-in area router. Form posts share one rate limiter.
pub fn auth_routes(limiter: &RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(auth::login)
                .layer(limiter.clone())
                .get(auth::login_page),
        )
        .route("/guest", post(auth::guest_login).layer(limiter.clone()))
        .route(
            "/signup",
            post(auth::signup)
                .layer(limiter.clone())
                .get(auth::signup_page),
        )
        .route(
            "/otp",
            post(auth::verify_otp)
                .layer(limiter.clone())
                .get(auth::otp_page),
        )
        .route("/otp/resend", post(auth::resend_otp).layer(limiter.clone()))
        .route(
            "/forgot-password",
            post(auth::forgot_password)
                .layer(limiter.clone())
                .get(auth::forgot_password_page),
        )
        .route(
            "/reset-password",
            post(auth::reset_password)
                .layer(limiter.clone())
                .get(auth::reset_password_page),
        )
        .route("/back", post(auth::back))
        .route("/logout", post(auth::logout))
}

/// Create the home feed router.
pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/more", post(home::load_more))
        .route("/language", post(home::switch_language))
}

/// Create the article router.
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(articles::show))
        .route("/{id}/comments", post(articles::post_comment))
        .route(
            "/{id}/draft",
            get(articles::confirm_draft).post(articles::move_to_draft),
        )
}

/// Create the admin panel router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin/drafts") }))
        .route("/drafts", get(admin::drafts))
        .route("/drafts/{id}/publish", post(admin::publish_draft))
        .route("/comments", get(admin::comments))
        .route("/comments/{id}/activate", post(admin::activate_comment))
        .route(
            "/comments/{id}/archive",
            get(admin::confirm_archive).post(admin::archive_comment),
        )
        .route(
            "/create-admin",
            get(admin::create_admin_page).post(admin::create_admin),
        )
        .route("/create-admin/reset", post(admin::reset_admin_form))
}

/// Create all routes for the portal.
pub fn routes(limiter: &RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .nest("/auth", auth_routes(limiter))
        .nest("/home", home_routes())
        .nest("/articles", article_routes())
        .nest("/admin", admin_routes())
}

/// Signed-in readers land on the feed, everyone else on sign-in.
async fn index(OptionalSession(current): OptionalSession) -> Redirect {
    if current.is_some() {
        Redirect::to("/home")
    } else {
        Redirect::to("/auth/login")
    }
}
