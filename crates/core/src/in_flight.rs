//! Duplicate-submission guards that survive being stored in a session.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A request that has been started and has not reported back yet.
///
/// The guard lapses at a deadline. A request whose handler never finished
/// (the client went away mid-call) therefore blocks the next attempt only
/// until the deadline, not for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight<T> {
    subject: T,
    until: DateTime<Utc>,
}

impl<T> InFlight<T> {
    /// Guard `subject` from `now` for `hold`.
    #[must_use]
    pub fn start(subject: T, now: DateTime<Utc>, hold: TimeDelta) -> Self {
        Self {
            subject,
            until: now
                .checked_add_signed(hold)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// What the guarded request is about.
    #[must_use]
    pub const fn subject(&self) -> &T {
        &self.subject
    }

    /// Whether the guard still holds at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.until
    }
}
