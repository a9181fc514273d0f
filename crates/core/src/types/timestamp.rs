//! Timestamps as the API sends them.

use core::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A timestamp string from the API.
///
/// The API emits naive UTC ISO-8601 (`2024-03-01T10:15:30.123456`), but an
/// offset form is accepted too. The raw text is kept so an unexpected format
/// never fails a whole page; it is only parsed for display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a naive UTC date-time, if the text is recognisable.
    #[must_use]
    pub fn parse(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    /// Short date for listings, e.g. `01 Mar 2024`. Falls back to the raw text.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.parse()
            .map_or_else(|| self.0.clone(), |dt| dt.format("%d %b %Y").to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_label_naive() {
        let ts = Timestamp::new("2024-03-01T10:15:30.123456");
        assert_eq!(ts.date_label(), "01 Mar 2024");
    }

    #[test]
    fn test_date_label_with_offset() {
        let ts = Timestamp::new("2024-12-25T23:00:00+05:30");
        assert_eq!(ts.date_label(), "25 Dec 2024");
    }

    #[test]
    fn test_date_label_falls_back_to_raw() {
        let ts = Timestamp::new("yesterday");
        assert_eq!(ts.date_label(), "yesterday");
    }
}
