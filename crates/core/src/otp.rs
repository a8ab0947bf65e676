//! One-time password codes and the resend countdown.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// A six digit code as typed by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse a code from form input.
    ///
    /// The length is checked before the character set, so `"12a"` reports a
    /// length problem rather than a non-digit one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OtpLength`] unless the trimmed input has
    /// exactly six characters, then [`ValidationError::OtpNotNumeric`] unless
    /// they are all ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let code = input.trim();
        if code.chars().count() != Self::LENGTH {
            return Err(ValidationError::OtpLength);
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::OtpNotNumeric);
        }
        Ok(Self(code.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Countdown that gates "resend code".
///
/// The timer is a deadline rather than a ticking counter, so it survives
/// being stored in the session between requests. Stopping it freezes the
/// remaining seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OtpTimer {
    Running { deadline: DateTime<Utc> },
    Stopped { remaining_secs: i64 },
}

impl OtpTimer {
    /// Lifetime of an issued code.
    pub const DURATION_SECS: i64 = 300;

    /// Start a fresh countdown at `now`.
    #[must_use]
    pub fn start(now: DateTime<Utc>) -> Self {
        Self::Running {
            deadline: now + TimeDelta::seconds(Self::DURATION_SECS),
        }
    }

    /// Whole seconds left, never negative.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match *self {
            Self::Running { deadline } => {
                let left = deadline - now;
                // Round partial seconds up so "0:00" only shows once expired.
                let secs = left.num_seconds() + i64::from(left.subsec_nanos() > 0);
                secs.clamp(0, Self::DURATION_SECS)
            }
            Self::Stopped { remaining_secs } => remaining_secs.max(0),
        }
    }

    /// Stop the countdown, keeping whatever was left.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        *self = Self::Stopped {
            remaining_secs: self.remaining_secs(now),
        };
    }

    /// Stop a running countdown once it reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.is_running() && self.remaining_secs(now) == 0 {
            self.stop(now);
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// A new code may only be requested once the countdown is at zero.
    #[must_use]
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    /// `m:ss`, e.g. `4:05`.
    #[must_use]
    pub fn display(&self, now: DateTime<Utc>) -> String {
        let secs = self.remaining_secs(now);
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}
