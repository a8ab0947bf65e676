//! Authentication middleware and extractors.
//!
//! Signed-in state is the presence of a [`CurrentSession`] in the session.
//! Handlers take the token from the extractor and pass it to the API client.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::models::{CurrentSession, Notice, session_keys};
use crate::routes::Chrome;

/// Extractor that requires a signed-in reader.
///
/// If nobody is signed in, returns a redirect to the sign-in page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(current): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user_name)
/// }
/// ```
pub struct RequireSession(pub CurrentSession);

/// Extractor that requires a signed-in ADMIN.
///
/// Readers with other roles get the "not authorized" page with a 403.
pub struct RequireAdmin(pub CurrentSession);

/// Error returned when a route needs a session it doesn't have.
pub enum AuthRejection {
    /// Redirect to the sign-in page.
    RedirectToLogin,
    /// Signed in, but not an admin.
    NotAuthorized(CurrentSession),
    /// The session layer is missing (misconfigured router).
    NoSessionLayer,
}

/// "You are not authorized to view this page."
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_authorized.html")]
pub struct NotAuthorizedTemplate {
    pub chrome: Chrome,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::NotAuthorized(current) => (
                StatusCode::FORBIDDEN,
                NotAuthorizedTemplate {
                    chrome: Chrome::new(Some(&current), None),
                },
            )
                .into_response(),
            Self::NoSessionLayer => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn current_session(parts: &Parts) -> Result<Option<CurrentSession>, AuthRejection> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::NoSessionLayer)?;

    Ok(session
        .get::<CurrentSession>(session_keys::CURRENT_SESSION)
        .await
        .ok()
        .flatten())
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_session(parts)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = current_session(parts)
            .await?
            .ok_or(AuthRejection::RedirectToLogin)?;
        if current.is_admin() {
            Ok(Self(current))
        } else {
            Err(AuthRejection::NotAuthorized(current))
        }
    }
}

/// Extractor that optionally gets the signed-in reader.
///
/// Unlike `RequireSession`, this does not reject the request.
pub struct OptionalSession(pub Option<CurrentSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_session(parts).await.ok().flatten()))
    }
}

/// Store a fresh sign-in.
///
/// The session id is cycled so a pre-login cookie cannot be reused, and
/// whatever the previous reader left behind (feed, admin lists, flow) is
/// dropped.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    current: &CurrentSession,
) -> Result<(), tower_sessions::session::Error> {
    session.clear().await;
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_SESSION, current).await?;
    set_sentry_user(&current.user_name, None);
    Ok(())
}

/// Forget the signed-in reader and everything held for them.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.clear().await;
    session.cycle_id().await?;
    clear_sentry_user();
    Ok(())
}

/// The API rejected the token: sign out and send the reader to sign-in.
pub async fn expire_session(session: &Session) -> Response {
    tracing::info!("API rejected token, ending session");
    if let Err(e) = sign_out(session).await {
        tracing::error!("Failed to clear expired session: {}", e);
    }
    if let Err(e) = Notice::warning(
        "Session expired",
        "Your session has expired. Please sign in again.",
    )
    .flash(session)
    .await
    {
        tracing::error!("Failed to store notice: {}", e);
    }
    Redirect::to("/auth/login").into_response()
}
