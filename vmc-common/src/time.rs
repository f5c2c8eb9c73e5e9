//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Elapsed time between two optional stamps, `None` unless both are present
/// and in order
pub fn elapsed(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Duration> {
    match (start, end) {
        (Some(start), Some(end)) if end >= start => Some(end - start),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_elapsed_both_present() {
        let start = now();
        let end = start + Duration::minutes(23);
        assert_eq!(elapsed(Some(start), Some(end)), Some(Duration::minutes(23)));
    }

    #[test]
    fn test_elapsed_missing_or_reversed() {
        let start = now();
        assert_eq!(elapsed(Some(start), None), None);
        assert_eq!(elapsed(None, Some(start)), None);
        assert_eq!(elapsed(Some(start), Some(start - Duration::seconds(1))), None);
    }
}
