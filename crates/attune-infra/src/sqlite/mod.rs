//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod assessment;
pub mod counter;
pub mod memory;
pub mod pool;
pub mod profile;
pub mod thread;

use attune_types::error::RepositoryError;
use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamp, so `ORDER BY created_at` sorts chronologically.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::microseconds(1500);
        assert_eq!(format_datetime(&whole), "2026-03-01T12:00:00.000000Z");
        assert_eq!(format_datetime(&fractional), "2026-03-01T12:00:00.001500Z");
        assert!(format_datetime(&whole) < format_datetime(&fractional));
    }

    #[test]
    fn test_parse_datetime_roundtrip_and_error() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
        assert!(parse_datetime("yesterday").is_err());
    }
}
