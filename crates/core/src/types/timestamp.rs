//! Timestamps as sent by the API.
//!
//! The API is not consistent: some fields carry RFC 3339 values with an
//! offset, others a naive `YYYY-MM-DDTHH:MM:SS[.f]`. The raw string is kept
//! so an unparseable value can still be shown verbatim.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A timestamp string from the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wrap a raw value.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The value exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a wall-clock time.
    ///
    /// Offsets are dropped: the value is shown as the newsroom wrote it.
    #[must_use]
    pub fn parse(&self) -> Option<NaiveDateTime> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// `January 5, 2024`
    #[must_use]
    pub fn long_date(&self) -> String {
        self.format_or_raw("%B %-d, %Y")
    }

    /// `January 5, 2024 at 03:04 PM`
    #[must_use]
    pub fn long_date_time(&self) -> String {
        self.format_or_raw("%B %-d, %Y at %I:%M %p")
    }

    /// `Jan 5, 2024, 03:04 PM`
    #[must_use]
    pub fn short_date_time(&self) -> String {
        self.format_or_raw("%b %-d, %Y, %I:%M %p")
    }

    fn format_or_raw(&self, fmt: &str) -> String {
        self.parse()
            .map_or_else(|| self.0.clone(), |dt| dt.format(fmt).to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        let ts = Timestamp::new("2024-01-05T15:04:05+06:00");
        assert_eq!(ts.long_date_time(), "January 5, 2024 at 03:04 PM");
    }

    #[test]
    fn test_naive_with_fraction() {
        let ts = Timestamp::new("2024-01-05T09:30:00.123456");
        assert_eq!(ts.long_date(), "January 5, 2024");
        assert_eq!(ts.short_date_time(), "Jan 5, 2024, 09:30 AM");
    }

    #[test]
    fn test_space_separated_and_date_only() {
        assert_eq!(
            Timestamp::new("2023-12-31 23:59:59").short_date_time(),
            "Dec 31, 2023, 11:59 PM"
        );
        assert_eq!(Timestamp::new("2023-07-04").long_date(), "July 4, 2023");
    }

    #[test]
    fn test_unparseable_is_shown_verbatim() {
        let ts = Timestamp::new("yesterday");
        assert!(ts.parse().is_none());
        assert_eq!(ts.long_date(), "yesterday");
        assert_eq!(ts.short_date_time(), "yesterday");
    }

    #[test]
    fn test_deserializes_from_plain_string() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-05T00:00:00Z\"").unwrap();
        assert_eq!(ts.as_str(), "2024-01-05T00:00:00Z");
    }
}
