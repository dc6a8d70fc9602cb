pub mod appointment;
pub mod doctor;
pub mod medical_record;
pub mod patient;
pub mod stats;

use chrono::{DateTime, Utc};

/// Parse a JSON-array column ("[...]") into a string list. Bad data reads
/// as empty rather than failing the whole query.
pub(crate) fn parse_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn to_json_string_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".into())
}

/// Parse a JSON-array column of tooth codes.
pub(crate) fn parse_teeth_list(raw: &str) -> Vec<u8> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn to_json_teeth_list(list: &[u8]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".into())
}

/// Parse an RFC 3339 timestamp column; bad data reads as the epoch.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}

pub(crate) fn parse_timestamp_opt(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_round_trip() {
        let list = vec!["alergia penicilina".to_string(), "diabetes".to_string()];
        let json = to_json_string_list(&list);
        assert_eq!(parse_string_list(&json), list);
    }

    #[test]
    fn bad_list_reads_empty() {
        assert!(parse_string_list("not json").is_empty());
        assert!(parse_teeth_list("{").is_empty());
    }

    #[test]
    fn timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&now.to_rfc3339());
        assert_eq!(parsed, now);
    }

    #[test]
    fn bad_timestamp_reads_epoch() {
        assert_eq!(parse_timestamp("garbage").timestamp(), 0);
        assert!(parse_timestamp_opt(Some("garbage".into())).is_none());
        assert!(parse_timestamp_opt(None).is_none());
    }
}
