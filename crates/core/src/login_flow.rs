//! Sign-in, sign-up, OTP verification and password reset as one state machine.
//!
//! The portal keeps a [`LoginFlow`] in the reader's session and calls the
//! transition methods after each API round-trip. The machine never talks to
//! the API itself; it only records which screen comes next and what it must
//! remember (the OTP target, the password for the automatic re-login, the
//! address whose password is being reset).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::otp::OtpTimer;

/// Screens of the sign-in area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginView {
    #[default]
    SignIn,
    SignUp,
    Otp,
    ForgotPassword,
    ResetPassword,
}

impl LoginView {
    /// Route that renders this screen.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/auth/login",
            Self::SignUp => "/auth/signup",
            Self::Otp => "/auth/otp",
            Self::ForgotPassword => "/auth/forgot-password",
            Self::ResetPassword => "/auth/reset-password",
        }
    }
}

/// Why a code was issued. Decides where a verified code leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OtpPurpose {
    Signup,
    Login,
    ForgotPassword,
}

/// An outstanding code: who it was sent to, why, and the resend countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub login: String,
    pub purpose: OtpPurpose,
    pub timer: OtpTimer,
}

/// What the caller must do after the API accepted a code.
#[derive(Clone, PartialEq, Eq)]
pub enum OtpOutcome {
    /// Account verified; the flow is back on sign-in.
    SignIn,
    /// Log in again with the credentials that were refused as unverified.
    RetryLogin { login: String, password: String },
    /// Show the new-password form.
    ResetPassword,
}

impl fmt::Debug for OtpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignIn => f.write_str("SignIn"),
            Self::RetryLogin { login, .. } => f
                .debug_struct("RetryLogin")
                .field("login", login)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ResetPassword => f.write_str("ResetPassword"),
        }
    }
}

/// The sign-in state machine.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFlow {
    view: LoginView,
    challenge: Option<OtpChallenge>,
    reset_email: Option<String>,
    pending_password: Option<String>,
}

impl fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFlow")
            .field("view", &self.view)
            .field("challenge", &self.challenge)
            .field("reset_email", &self.reset_email)
            .field(
                "pending_password",
                &self.pending_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl LoginFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn view(&self) -> LoginView {
        self.view
    }

    #[must_use]
    pub const fn challenge(&self) -> Option<&OtpChallenge> {
        self.challenge.as_ref()
    }

    #[must_use]
    pub fn reset_email(&self) -> Option<&str> {
        self.reset_email.as_deref()
    }

    /// Go to sign-in or sign-up. Everything else the flow remembered is
    /// dropped, including any running countdown.
    pub fn switch_to(&mut self, view: LoginView) {
        *self = Self { view, ..Self::default() };
    }

    /// Open the "forgot password" form. A previously entered address is kept.
    pub fn open_forgot_password(&mut self) {
        self.view = LoginView::ForgotPassword;
    }

    /// The account was created and a code was mailed to `email`.
    pub fn signup_succeeded(&mut self, email: impl Into<String>, now: DateTime<Utc>) {
        self.issue(email.into(), OtpPurpose::Signup, now);
    }

    /// Login was refused because the account is not verified yet; the API
    /// mailed a code. The password is kept for the re-login after
    /// verification.
    pub fn login_unverified(
        &mut self,
        login: impl Into<String>,
        password: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.pending_password = Some(password.into());
        self.issue(login.into(), OtpPurpose::Login, now);
    }

    /// A reset code was mailed to `email`.
    pub fn forgot_password_sent(&mut self, email: impl Into<String>, now: DateTime<Utc>) {
        let email = email.into();
        self.reset_email = Some(email.clone());
        self.issue(email, OtpPurpose::ForgotPassword, now);
    }

    fn issue(&mut self, login: String, purpose: OtpPurpose, now: DateTime<Utc>) {
        self.view = LoginView::Otp;
        self.challenge = Some(OtpChallenge {
            login,
            purpose,
            timer: OtpTimer::start(now),
        });
    }

    /// The API accepted the code. Returns `None` when no code is outstanding.
    pub fn otp_verified(&mut self, now: DateTime<Utc>) -> Option<OtpOutcome> {
        let challenge = self.challenge.as_mut()?;
        challenge.timer.stop(now);
        match challenge.purpose {
            OtpPurpose::Signup => {
                self.switch_to(LoginView::SignIn);
                Some(OtpOutcome::SignIn)
            }
            OtpPurpose::Login => Some(OtpOutcome::RetryLogin {
                login: challenge.login.clone(),
                password: self.pending_password.clone().unwrap_or_default(),
            }),
            OtpPurpose::ForgotPassword => {
                self.view = LoginView::ResetPassword;
                Some(OtpOutcome::ResetPassword)
            }
        }
    }

    /// Whether "resend code" is allowed right now.
    #[must_use]
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        self.challenge
            .as_ref()
            .is_some_and(|c| c.timer.can_resend(now))
    }

    /// A new code went out; start the countdown again.
    pub fn restart_timer(&mut self, now: DateTime<Utc>) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.timer = OtpTimer::start(now);
        }
    }

    /// Stop a countdown that has run out. Never changes the screen.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.timer.tick(now);
        }
    }

    /// Countdown shown on the OTP screen.
    #[must_use]
    pub fn timer_display(&self, now: DateTime<Utc>) -> String {
        self.challenge
            .as_ref()
            .map_or_else(|| "0:00".to_owned(), |c| c.timer.display(now))
    }

    /// The new password was stored; start over at sign-in.
    pub fn password_reset_succeeded(&mut self) {
        self.switch_to(LoginView::SignIn);
    }

    /// The "back" link.
    pub fn back(&mut self, now: DateTime<Utc>) {
        match self.view {
            LoginView::Otp => {
                let purpose = self.challenge.as_ref().map(|c| c.purpose);
                self.view = match purpose {
                    Some(OtpPurpose::ForgotPassword) => LoginView::ForgotPassword,
                    Some(OtpPurpose::Signup) => LoginView::SignUp,
                    Some(OtpPurpose::Login) | None => LoginView::SignIn,
                };
                if let Some(challenge) = self.challenge.as_mut() {
                    challenge.timer.stop(now);
                }
            }
            LoginView::ResetPassword => self.view = LoginView::Otp,
            LoginView::ForgotPassword => self.view = LoginView::SignIn,
            LoginView::SignIn | LoginView::SignUp => {}
        }
    }
}
