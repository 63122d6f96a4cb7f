//! Validation of untrusted raw events.
//!
//! A raw event either becomes a [`DatedEvent`] (typed counters plus the UTC
//! calendar day it belongs to) or is rejected with a [`SkipReason`]. There is
//! no partial acceptance.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::RawEvent;

/// Offset timestamp layouts RFC 3339 rejects, e.g. `+0200` without a colon.
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Naive timestamp layouts accepted for `date`; interpreted as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A validated event, truncated to its UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedEvent {
    pub website_id: String,
    pub day: NaiveDate,
    pub chats: u64,
    pub missed_chats: u64,
}

/// Why a raw event was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    MissingWebsiteId,
    InvalidChats,
    InvalidMissedChats,
    MissingDate,
    InvalidDate(String),
    /// Adding the event would overflow its website's running total
    CounterOverflow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "entry is not an object"),
            Self::MissingWebsiteId => write!(f, "missing or empty websiteId"),
            Self::InvalidChats => write!(f, "chats is not a non-negative integer"),
            Self::InvalidMissedChats => {
                write!(f, "missedChats is not a non-negative integer")
            }
            Self::MissingDate => write!(f, "missing date"),
            Self::InvalidDate(raw) => write!(f, "unparseable date {}", raw),
            Self::CounterOverflow => write!(f, "counter total would overflow"),
        }
    }
}

impl RawEvent {
    /// Checks field presence and types, then resolves the event's UTC day.
    pub fn validate(&self) -> Result<DatedEvent, SkipReason> {
        let website_id = match &self.website_id {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(SkipReason::MissingWebsiteId),
        };
        let chats = parse_count(self.chats.as_ref()).ok_or(SkipReason::InvalidChats)?;
        let missed_chats =
            parse_count(self.missed_chats.as_ref()).ok_or(SkipReason::InvalidMissedChats)?;

        let date = match &self.date {
            None => return Err(SkipReason::MissingDate),
            Some(Value::String(s)) if s.is_empty() => return Err(SkipReason::MissingDate),
            Some(date) => date,
        };
        let instant = parse_instant(date)?;

        Ok(DatedEvent {
            website_id,
            day: instant.date_naive(),
            chats,
            missed_chats,
        })
    }
}

/// Validates one element of the upstream array.
pub fn parse_event(value: &Value) -> Result<DatedEvent, SkipReason> {
    if !value.is_object() {
        return Err(SkipReason::NotAnObject);
    }
    let raw = RawEvent::deserialize(value).map_err(|_| SkipReason::NotAnObject)?;
    raw.validate()
}

/// Counters must be JSON numbers holding a non-negative integer.
/// `100.0` is accepted, `1.5` and `-3` are not.
fn parse_count(value: Option<&Value>) -> Option<u64> {
    let Value::Number(n) = value? else {
        return None;
    };
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn parse_instant(value: &Value) -> Result<DateTime<Utc>, SkipReason> {
    match value {
        Value::String(s) => parse_timestamp(s).ok_or_else(|| SkipReason::InvalidDate(s.clone())),
        // Numeric dates are epoch milliseconds
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| SkipReason::InvalidDate(n.to_string())),
        other => Err(SkipReason::InvalidDate(other.to_string())),
    }
}

/// Parses RFC 3339, an ISO timestamp with a `+HHMM` offset, a naive timestamp
/// (taken as UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_TIMESTAMP_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&date.and_time(midnight)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_valid_event() {
        let event = parse_event(&json!({
            "websiteId": "4f8b36d00000000000000001",
            "date": "2019-04-05T00:00:00.000Z",
            "chats": 100,
            "missedChats": 5,
        }))
        .unwrap();

        assert_eq!(event.website_id, "4f8b36d00000000000000001");
        assert_eq!(event.day, day("2019-04-05"));
        assert_eq!(event.chats, 100);
        assert_eq!(event.missed_chats, 5);
    }

    #[test]
    fn test_late_timestamp_truncates_to_utc_day() {
        let event = parse_event(&json!({
            "websiteId": "W1",
            "date": "2019-04-05T23:59:59.999Z",
            "chats": 1,
            "missedChats": 0,
        }))
        .unwrap();
        assert_eq!(event.day, day("2019-04-05"));

        // +02:00 offset lands on the previous UTC day
        let event = parse_event(&json!({
            "websiteId": "W1",
            "date": "2019-04-06T01:00:00+02:00",
            "chats": 1,
            "missedChats": 0,
        }))
        .unwrap();
        assert_eq!(event.day, day("2019-04-05"));
    }

    #[test]
    fn test_missing_website_id() {
        for id in [json!(null), json!(""), json!(42)] {
            let result = parse_event(&json!({
                "websiteId": id,
                "date": "2019-04-05",
                "chats": 1,
                "missedChats": 1,
            }));
            assert_eq!(result, Err(SkipReason::MissingWebsiteId));
        }
    }

    #[test]
    fn test_invalid_counters() {
        let base = |chats: Value, missed: Value| {
            json!({"websiteId": "W1", "date": "2019-04-05", "chats": chats, "missedChats": missed})
        };

        assert_eq!(
            parse_event(&base(json!("10"), json!(1))),
            Err(SkipReason::InvalidChats)
        );
        assert_eq!(
            parse_event(&base(json!(-3), json!(1))),
            Err(SkipReason::InvalidChats)
        );
        assert_eq!(
            parse_event(&base(json!(1.5), json!(1))),
            Err(SkipReason::InvalidChats)
        );
        assert_eq!(
            parse_event(&base(json!(1), json!(null))),
            Err(SkipReason::InvalidMissedChats)
        );
        assert_eq!(parse_event(&base(json!(100.0), json!(0))).unwrap().chats, 100);
    }

    #[test]
    fn test_missing_and_invalid_date() {
        assert_eq!(
            parse_event(&json!({"websiteId": "W1", "chats": 1, "missedChats": 1})),
            Err(SkipReason::MissingDate)
        );
        assert_eq!(
            parse_event(&json!({"websiteId": "W1", "date": "", "chats": 1, "missedChats": 1})),
            Err(SkipReason::MissingDate)
        );
        assert_eq!(
            parse_event(&json!({
                "websiteId": "W1",
                "date": "invalid-date",
                "chats": 1,
                "missedChats": 1,
            })),
            Err(SkipReason::InvalidDate("invalid-date".to_string()))
        );
        assert!(matches!(
            parse_event(&json!({"websiteId": "W1", "date": true, "chats": 1, "missedChats": 1})),
            Err(SkipReason::InvalidDate(_))
        ));
    }

    #[test]
    fn test_non_object_entries() {
        assert_eq!(parse_event(&json!(null)), Err(SkipReason::NotAnObject));
        assert_eq!(parse_event(&json!([1, 2])), Err(SkipReason::NotAnObject));
        assert_eq!(parse_event(&json!("W1")), Err(SkipReason::NotAnObject));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2019, 4, 5, 13, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2019-04-05T13:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2019-04-05T13:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2019-04-05 13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2019-04-05T13:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2019-04-05"),
            Some(Utc.with_ymd_and_hms(2019, 4, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("2019-04-05T15:30:00+0200"), Some(expected));
        assert_eq!(parse_timestamp("2019-04-05 11:30:00.000-0200"), Some(expected));
        assert_eq!(parse_timestamp("05/04/2019"), None);
    }

    #[test]
    fn test_epoch_millis_date() {
        let millis = Utc
            .with_ymd_and_hms(2019, 4, 6, 12, 0, 0)
            .unwrap()
            .timestamp_millis();
        let event = parse_event(&json!({
            "websiteId": "W1",
            "date": millis,
            "chats": 3,
            "missedChats": 1,
        }))
        .unwrap();
        assert_eq!(event.day, day("2019-04-06"));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::InvalidDate("x".into()).to_string(),
            "unparseable date x"
        );
        assert_eq!(SkipReason::MissingWebsiteId.to_string(), "missing or empty websiteId");
    }
}
