//! Brief Bulletin Core - Shared types library.
//!
//! This crate provides the types used across all Brief Bulletin components:
//! - `portal` - Reader and admin web portal
//! - `cli` - Command-line moderation tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! HTTP clients, no clocks. Functions that depend on time take `now` as an
//! argument so callers (and tests) decide what "now" is.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, e-mail, roles, languages, articles and comments
//! - [`login_flow`] - Sign-in / sign-up / OTP / password reset state machine
//! - [`otp`] - OTP codes and the resend countdown
//! - [`validation`] - Form validation shared by the portal and the CLI
//! - [`feed`] - Cursor pagination for the home feed
//! - [`in_flight`] - Duplicate-submission guards with a deadline

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod feed;
pub mod in_flight;
pub mod login_flow;
pub mod otp;
pub mod types;
pub mod validation;

pub use feed::{Feed, Identified, PageRequest};
pub use in_flight::InFlight;
pub use login_flow::{LoginFlow, LoginView, OtpChallenge, OtpOutcome, OtpPurpose};
pub use otp::{OtpCode, OtpTimer};
pub use types::*;
pub use validation::{
    ForgotPasswordForm, ResetPasswordForm, SignInForm, SignUpForm, ValidationError,
};
