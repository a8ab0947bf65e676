//! Sign-in area route handlers.
//!
//! The [`LoginFlow`] state machine lives in the session. GET handlers render
//! the screen the flow is on and only write a flow the session already
//! holds; POST handlers call the API, apply the transition and redirect to
//! `flow.view().path()`. Validation and API
//! failures re-render the form with an error dialog so typed values survive.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use brief_bulletin_core::{
    Email, ForgotPasswordForm, LoginFlow, LoginView, OtpCode, OtpOutcome, OtpPurpose,
    ResetPasswordForm, SignInForm, SignUpForm,
};
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use crate::api::{ApiError, LoginPayload, NewUser};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalSession, sign_in, sign_out};
use crate::models::{CurrentSession, Notice, session_keys};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// OTP entry form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpForm {
    pub otp: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub login: String,
    pub guest_enabled: bool,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub chrome: Chrome,
    pub email: String,
    pub phone: String,
    pub user_name: String,
}

/// Code entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/otp.html")]
pub struct OtpTemplate {
    pub chrome: Chrome,
    /// Where the code went, masked when it is an e-mail address.
    pub target: String,
    pub heading: &'static str,
    pub timer: String,
    pub can_resend: bool,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub chrome: Chrome,
    pub email: String,
}

/// New password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub chrome: Chrome,
    pub email: String,
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_flow(session: &Session) -> Result<LoginFlow> {
    Ok(session
        .get::<LoginFlow>(session_keys::LOGIN_FLOW)
        .await?
        .unwrap_or_default())
}

async fn store_flow(session: &Session, flow: &LoginFlow) -> Result<()> {
    session.insert(session_keys::LOGIN_FLOW, flow).await?;
    Ok(())
}

/// Apply `change` to the flow the session holds and store it if it moved.
///
/// A visitor without a flow gets a fresh one and nothing is written, so
/// browsing the sign-in pages creates no session.
async fn update_flow(
    session: &Session,
    change: impl FnOnce(&mut LoginFlow),
) -> Result<LoginFlow> {
    let Some(mut flow) = session.get::<LoginFlow>(session_keys::LOGIN_FLOW).await? else {
        let mut flow = LoginFlow::new();
        change(&mut flow);
        return Ok(flow);
    };

    let before = flow.clone();
    change(&mut flow);
    if flow != before {
        store_flow(session, &flow).await?;
    }
    Ok(flow)
}

/// Flash `notice` and follow the flow to its current screen.
async fn redirect_with(session: &Session, notice: Notice, to: LoginView) -> Result<Response> {
    notice.flash(session).await?;
    Ok(Redirect::to(to.path()).into_response())
}

fn validation_error(message: impl Into<String>) -> Notice {
    Notice::error("Validation Error", message)
}

/// Store the session for a successful login and go to the feed.
async fn complete_sign_in(session: &Session, payload: LoginPayload) -> Result<Response> {
    let current = CurrentSession::from(payload);
    sign_in(session, &current).await?;
    add_breadcrumb("auth", "Signed in", Some(&[("role", current.role.as_str())]));
    tracing::info!(
        user_name = %current.user_name,
        role = current.role.as_str(),
        "Reader signed in"
    );
    Ok(Redirect::to("/home").into_response())
}

fn otp_template(flow: &LoginFlow, chrome: Chrome) -> OtpTemplate {
    let now = Utc::now();
    let (target, heading) = flow.challenge().map_or_else(
        || (String::new(), "Verify your account"),
        |challenge| {
            let target = Email::parse(&challenge.login)
                .map_or_else(|_| challenge.login.clone(), |email| email.masked());
            let heading = match challenge.purpose {
                OtpPurpose::Signup => "Verify your email",
                OtpPurpose::Login => "Verify your account",
                OtpPurpose::ForgotPassword => "Reset your password",
            };
            (target, heading)
        },
    );
    OtpTemplate {
        chrome,
        target,
        heading,
        timer: flow.timer_display(now),
        can_resend: flow.can_resend(now),
    }
}

// =============================================================================
// Sign In
// =============================================================================

/// Display the sign-in form. Opening it resets the flow.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    OptionalSession(current): OptionalSession,
    session: Session,
) -> Result<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    update_flow(&session, |flow| flow.switch_to(LoginView::SignIn)).await?;

    Ok(LoginTemplate {
        chrome: Chrome::load(&session, None).await,
        login: String::new(),
        guest_enabled: state.config().guest.is_some(),
    }
    .into_response())
}

/// Handle the sign-in form.
///
/// A 403 means the account is not verified yet: the API has mailed a code
/// and the flow moves to the OTP screen, keeping the password for the
/// automatic re-login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    let render = async |notice: Notice| {
        LoginTemplate {
            chrome: Chrome::showing(&session, None, notice).await,
            login: form.login.clone(),
            guest_enabled: state.config().guest.is_some(),
        }
        .into_response()
    };

    if let Err(e) = form.validate() {
        return Ok(render(validation_error(e.to_string())).await);
    }

    let login = form.login.trim();
    let password = SecretString::from(form.password.clone());
    match state.api().login(login, &password).await {
        Ok(payload) => complete_sign_in(&session, payload).await,
        Err(e) if e.is_unverified() => {
            tracing::info!("Login refused until the account is verified");
            let mut flow = load_flow(&session).await?;
            flow.login_unverified(login, form.password.as_str(), Utc::now());
            store_flow(&session, &flow).await?;
            let notice = Notice::info(
                "Verification Required",
                e.user_message("OTP sent to your email. Please verify yourself to login."),
            );
            redirect_with(&session, notice, flow.view()).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let notice = Notice::error("Login Failed", e.user_message("Invalid credentials"));
            Ok(render(notice).await)
        }
    }
}

/// "Continue as guest" with the configured shared account.
#[instrument(skip_all)]
pub async fn guest_login(State(state): State<AppState>, session: Session) -> Result<Response> {
    let Some(guest) = state.config().guest.as_ref() else {
        return Ok(Redirect::to(LoginView::SignIn.path()).into_response());
    };

    match state.api().login(&guest.login, &guest.password).await {
        Ok(payload) => complete_sign_in(&session, payload).await,
        Err(e) => {
            tracing::warn!(error = %e, "Guest login failed");
            let notice = Notice::error("Login Failed", e.user_message("Invalid credentials"));
            redirect_with(&session, notice, LoginView::SignIn).await
        }
    }
}

// =============================================================================
// Sign Up
// =============================================================================

/// Display the sign-up form. Opening it resets the flow.
#[instrument(skip_all)]
pub async fn signup_page(
    OptionalSession(current): OptionalSession,
    session: Session,
) -> Result<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    update_flow(&session, |flow| flow.switch_to(LoginView::SignUp)).await?;

    Ok(SignUpTemplate {
        chrome: Chrome::load(&session, None).await,
        email: String::new(),
        phone: String::new(),
        user_name: String::new(),
    }
    .into_response())
}

/// Handle the sign-up form. On success the API mails a verification code.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Response> {
    let render = async |notice: Notice| {
        SignUpTemplate {
            chrome: Chrome::showing(&session, None, notice).await,
            email: form.email.clone(),
            phone: form.phone.clone(),
            user_name: form.user_name.clone(),
        }
        .into_response()
    };

    if let Err(e) = form.validate() {
        return Ok(render(validation_error(e.to_string())).await);
    }

    let user = NewUser {
        email: form.email.trim().to_owned(),
        password: form.password.clone(),
        phone: form.phone.trim().to_owned(),
        user_name: form.user_name.trim().to_owned(),
        role: None,
    };

    match state.api().create_user(&user).await {
        Ok(envelope) => {
            let mut flow = load_flow(&session).await?;
            flow.signup_succeeded(user.email.as_str(), Utc::now());
            store_flow(&session, &flow).await?;
            let notice = Notice::success("Success", envelope.message_or("OTP sent to your email"));
            redirect_with(&session, notice, flow.view()).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            let notice = Notice::error("Error", e.user_message("Failed to create account"));
            Ok(render(notice).await)
        }
    }
}

// =============================================================================
// OTP
// =============================================================================

/// Display the code entry screen with the resend countdown.
#[instrument(skip_all)]
pub async fn otp_page(session: Session) -> Result<Response> {
    // A countdown that ran out while the reader was away stops here
    let flow = update_flow(&session, |flow| flow.tick(Utc::now())).await?;
    if flow.view() != LoginView::Otp {
        return Ok(Redirect::to(flow.view().path()).into_response());
    }

    let chrome = Chrome::load(&session, None).await;
    Ok(otp_template(&flow, chrome).into_response())
}

/// Verify the entered code and continue according to why it was sent.
#[instrument(skip_all)]
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    let Some(challenge) = flow.challenge().filter(|_| flow.view() == LoginView::Otp) else {
        return Ok(Redirect::to(flow.view().path()).into_response());
    };

    let code = match OtpCode::parse(&form.otp) {
        Ok(code) => code,
        Err(e) => {
            let chrome = Chrome::showing(&session, None, validation_error(e.to_string())).await;
            return Ok(otp_template(&flow, chrome).into_response());
        }
    };

    let login = challenge.login.clone();
    if let Err(e) = state.api().verify_otp(&login, &code).await {
        tracing::warn!(error = %e, "OTP verification failed");
        let notice = match e {
            ApiError::Rejected { .. } => {
                Notice::error("Invalid OTP", "The OTP you entered is invalid or expired")
            }
            e => Notice::error("Error", e.user_message("Invalid OTP")),
        };
        let chrome = Chrome::showing(&session, None, notice).await;
        return Ok(otp_template(&flow, chrome).into_response());
    }

    let outcome = flow.otp_verified(Utc::now());
    store_flow(&session, &flow).await?;

    match outcome {
        Some(OtpOutcome::SignIn) => {
            let notice = Notice::success("Success", "Account created successfully! Please login.");
            redirect_with(&session, notice, flow.view()).await
        }
        Some(OtpOutcome::RetryLogin { login, password }) => {
            match state.api().login(&login, &SecretString::from(password)).await {
                Ok(payload) => complete_sign_in(&session, payload).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Login after verification failed");
                    let notice = Notice::error("Error", "Login failed after verification");
                    redirect_with(&session, notice, flow.view()).await
                }
            }
        }
        Some(OtpOutcome::ResetPassword) | None => {
            Ok(Redirect::to(flow.view().path()).into_response())
        }
    }
}

/// Mail a fresh code. Refused silently while the countdown is running.
#[instrument(skip_all)]
pub async fn resend_otp(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    let now = Utc::now();
    let Some(challenge) = flow
        .challenge()
        .filter(|_| flow.view() == LoginView::Otp && flow.can_resend(now))
    else {
        return Ok(Redirect::to(flow.view().path()).into_response());
    };

    let login = challenge.login.clone();
    let notice = match state.api().send_otp(&login).await {
        Ok(_) => {
            flow.restart_timer(now);
            store_flow(&session, &flow).await?;
            Notice::success("Success", "OTP has been resent to your email")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Resending OTP failed");
            Notice::error("Error", e.user_message("Failed to resend OTP"))
        }
    };
    redirect_with(&session, notice, flow.view()).await
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display the "forgot password" form. A previously entered address is kept.
#[instrument(skip_all)]
pub async fn forgot_password_page(session: Session) -> Result<Response> {
    let flow = update_flow(&session, LoginFlow::open_forgot_password).await?;

    Ok(ForgotPasswordTemplate {
        chrome: Chrome::load(&session, None).await,
        email: flow.reset_email().unwrap_or_default().to_owned(),
    }
    .into_response())
}

/// Mail a reset code.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response> {
    let render = async |notice: Notice| {
        ForgotPasswordTemplate {
            chrome: Chrome::showing(&session, None, notice).await,
            email: form.email.clone(),
        }
        .into_response()
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(e) => return Ok(render(validation_error(e.to_string())).await),
    };

    match state.api().send_otp(email).await {
        Ok(_) => {
            let mut flow = load_flow(&session).await?;
            flow.forgot_password_sent(email, Utc::now());
            store_flow(&session, &flow).await?;
            let notice = Notice::success("Success", "OTP sent to your email");
            redirect_with(&session, notice, flow.view()).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sending reset code failed");
            let notice = Notice::error("Error", e.user_message("Failed to send OTP"));
            Ok(render(notice).await)
        }
    }
}

/// Display the new password form once the reset code was verified.
#[instrument(skip_all)]
pub async fn reset_password_page(session: Session) -> Result<Response> {
    let flow = load_flow(&session).await?;
    let Some(email) = flow
        .reset_email()
        .filter(|_| flow.view() == LoginView::ResetPassword)
    else {
        return Ok(Redirect::to(flow.view().path()).into_response());
    };

    Ok(ResetPasswordTemplate {
        email: email.to_owned(),
        chrome: Chrome::load(&session, None).await,
    }
    .into_response())
}

/// Store the new password.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    let Some(email) = flow
        .reset_email()
        .filter(|_| flow.view() == LoginView::ResetPassword)
        .map(str::to_owned)
    else {
        return Ok(Redirect::to(flow.view().path()).into_response());
    };

    let render = async |notice: Notice| {
        ResetPasswordTemplate {
            chrome: Chrome::showing(&session, None, notice).await,
            email: email.clone(),
        }
        .into_response()
    };

    if let Err(e) = form.validate() {
        return Ok(render(validation_error(e.to_string())).await);
    }

    let new_password = SecretString::from(form.new_password.clone());
    match state.api().reset_password(&email, &new_password).await {
        Ok(_) => {
            flow.password_reset_succeeded();
            store_flow(&session, &flow).await?;
            add_breadcrumb("auth", "Password reset", None);
            let notice = Notice::success("Success", "Password reset successfully! Please login.");
            redirect_with(&session, notice, flow.view()).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password reset failed");
            let notice = Notice::error("Error", e.user_message("Failed to reset password"));
            Ok(render(notice).await)
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// The flow's "back" link.
#[instrument(skip_all)]
pub async fn back(session: Session) -> Result<Response> {
    let flow = update_flow(&session, |flow| flow.back(Utc::now())).await?;
    Ok(Redirect::to(flow.view().path()).into_response())
}

/// Sign out and forget everything held for the reader.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response> {
    sign_out(&session).await?;
    Ok(Redirect::to(LoginView::SignIn.path()).into_response())
}
