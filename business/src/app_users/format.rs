//! Display formatting for user creation timestamps.

use chrono::{DateTime, Utc};

/// Turns a timestamp into the string shown next to a user.
///
/// Called once per record when the list is loaded, never afterwards.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, timestamp: DateTime<Utc>) -> String;
}

impl<F> DateFormatter for F
where
    F: Fn(DateTime<Utc>) -> String + Send + Sync,
{
    fn format_date(&self, timestamp: DateTime<Utc>) -> String {
        self(timestamp)
    }
}

/// `strftime`-style formatter backed by `chrono`, rendered in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChronoDateFormatter {
    pattern: &'static str,
}

impl ChronoDateFormatter {
    /// `Jan 5, 2020, 3:04 PM`
    pub const DEFAULT_PATTERN: &'static str = "%b %-d, %Y, %-I:%M %p";

    pub const fn with_pattern(pattern: &'static str) -> Self {
        Self { pattern }
    }
}

impl Default for ChronoDateFormatter {
    fn default() -> Self {
        Self::with_pattern(Self::DEFAULT_PATTERN)
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn format_date(&self, timestamp: DateTime<Utc>) -> String {
        timestamp.format(self.pattern).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn default_pattern() {
        let formatted = ChronoDateFormatter::default().format_date(at("2020-01-05T15:04:00Z"));
        assert_eq!(formatted, "Jan 5, 2020, 3:04 PM");
    }

    #[test]
    fn default_pattern_morning() {
        let formatted = ChronoDateFormatter::default().format_date(at("2021-11-30T00:30:00Z"));
        assert_eq!(formatted, "Nov 30, 2021, 12:30 AM");
    }

    #[test]
    fn custom_pattern() {
        let formatter = ChronoDateFormatter::with_pattern("%Y-%m-%d");
        assert_eq!(formatter.format_date(at("2020-01-05T15:04:00Z")), "2020-01-05");
    }

    #[test]
    fn closures_are_formatters() {
        let formatter = |ts: DateTime<Utc>| ts.timestamp().to_string();
        assert_eq!(formatter.format_date(at("1970-01-01T00:01:00Z")), "60");
    }
}
