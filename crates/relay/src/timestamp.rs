//! Event timestamp normalization.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::IngestError;

/// Convert an epoch-millisecond numeric string into a UTC instant truncated
/// to whole seconds. The store's date property carries second precision, so
/// truncation is the contract here.
///
/// # Errors
/// Returns `InvalidTimestamp` if the input is not a base-10 integer or falls
/// outside the representable date range.
pub fn normalize_event_time(raw: &str) -> Result<DateTime<Utc>, IngestError> {
    let millis: i64 = raw
        .parse()
        .map_err(|_| IngestError::InvalidTimestamp(raw.to_string()))?;

    Utc.timestamp_opt(millis / 1000, 0)
        .single()
        .ok_or_else(|| IngestError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_second_input() {
        let instant = normalize_event_time("1700000000000").unwrap();
        assert_eq!(instant, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn test_sub_second_precision_truncated() {
        let instant = normalize_event_time("1700000000999").unwrap();
        assert_eq!(instant, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(instant.timestamp_subsec_millis(), 0);
    }

    #[test]
    fn test_ordering_preserved() {
        let earlier = normalize_event_time("1700000000000").unwrap();
        let later = normalize_event_time("1700000001000").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_non_numeric_input_rejected() {
        for raw in ["", "abc", "17.5", "1700000000000x"] {
            let err = normalize_event_time(raw).unwrap_err();
            assert!(matches!(err, IngestError::InvalidTimestamp(_)), "{raw}");
        }
    }

    #[test]
    fn test_out_of_range_input_rejected() {
        let err = normalize_event_time(&i64::MAX.to_string()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimestamp(_)));
    }
}
