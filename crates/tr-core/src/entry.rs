//! Raw time entries and their decoding from detail-report JSON.

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while turning report items into entries.
#[derive(Debug, Error)]
pub enum EntryError {
    /// A field the engine cannot do without was absent or null.
    #[error("entry is missing required field `{0}`")]
    MissingField(&'static str),
    /// The start timestamp could not be parsed.
    #[error("invalid start timestamp {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The duration was below zero.
    #[error("negative duration: {0} ms")]
    NegativeDuration(i64),
    /// An item in a list failed to convert.
    #[error("item {index}: {error}")]
    Item {
        index: usize,
        error: Box<EntryError>,
    },
    /// The response body was not valid report JSON.
    #[error("invalid detail report JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One tracked interval, as the aggregation engine consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub start: DateTime<FixedOffset>,
    pub client: String,
    pub project: String,
    /// The task label.
    pub description: String,
    pub duration_ms: u64,
}

impl RawEntry {
    /// The calendar day this entry is reported under.
    pub fn date(&self, basis: DateBasis) -> NaiveDate {
        basis.date_of(&self.start)
    }
}

/// Which clock decides the calendar day of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateBasis {
    /// The wall-clock day written in the timestamp's own offset.
    #[default]
    EntryOffset,
    /// The day in a fixed IANA zone.
    Zone(Tz),
}

impl DateBasis {
    pub fn date_of(self, start: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            Self::EntryOffset => start.date_naive(),
            Self::Zone(tz) => start.with_timezone(&tz).date_naive(),
        }
    }
}

/// One item of the tracking service's detail report.
///
/// Unknown fields are ignored. Label fields may be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailItem {
    pub start: Option<String>,
    pub client: Option<String>,
    pub project: Option<String>,
    pub description: Option<String>,
    /// Duration in milliseconds.
    pub dur: Option<i64>,
}

impl TryFrom<DetailItem> for RawEntry {
    type Error = EntryError;

    fn try_from(item: DetailItem) -> Result<Self, Self::Error> {
        let start = item.start.ok_or(EntryError::MissingField("start"))?;
        let dur = item.dur.ok_or(EntryError::MissingField("dur"))?;
        let duration_ms = u64::try_from(dur).map_err(|_| EntryError::NegativeDuration(dur))?;
        let start = parse_timestamp(&start)?;

        Ok(Self {
            start,
            client: item.client.unwrap_or_default(),
            project: item.project.unwrap_or_default(),
            description: item.description.unwrap_or_default(),
            duration_ms,
        })
    }
}

/// Parses an ISO 8601 timestamp that carries an offset.
///
/// Accepts RFC 3339 (`2024-01-15T09:30:00+01:00`) as well as the compact
/// offset form (`2024-01-15T09:30:00+0100`).
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, EntryError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|source| EntryError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

/// Converts report items into entries, stopping at the first bad item.
pub fn entries_from_items(items: Vec<DetailItem>) -> Result<Vec<RawEntry>, EntryError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            RawEntry::try_from(item).map_err(|error| EntryError::Item {
                index,
                error: Box::new(error),
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailBody {
    Wrapped { data: Vec<DetailItem> },
    Bare(Vec<DetailItem>),
}

/// Decodes a detail-report body: either `{"data": [...]}` or a bare array.
pub fn parse_detail_response(body: &str) -> Result<Vec<RawEntry>, EntryError> {
    let items = match serde_json::from_str::<DetailBody>(body)? {
        DetailBody::Wrapped { data } | DetailBody::Bare(data) => data,
    };
    entries_from_items(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(start: &str, dur: i64) -> DetailItem {
        DetailItem {
            start: Some(start.to_string()),
            client: Some("Acme".to_string()),
            project: Some("Website".to_string()),
            description: Some("Design".to_string()),
            dur: Some(dur),
        }
    }

    #[test]
    fn test_converts_complete_item() {
        let entry = RawEntry::try_from(item("2024-01-15T09:30:00+01:00", 600_000)).unwrap();
        assert_eq!(entry.client, "Acme");
        assert_eq!(entry.project, "Website");
        assert_eq!(entry.description, "Design");
        assert_eq!(entry.duration_ms, 600_000);
        assert_eq!(entry.start.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_missing_start_is_fatal() {
        let mut raw = item("2024-01-15T09:30:00+01:00", 1);
        raw.start = None;
        assert!(matches!(
            RawEntry::try_from(raw),
            Err(EntryError::MissingField("start"))
        ));
    }

    #[test]
    fn test_missing_duration_is_fatal() {
        let mut raw = item("2024-01-15T09:30:00+01:00", 1);
        raw.dur = None;
        assert!(matches!(
            RawEntry::try_from(raw),
            Err(EntryError::MissingField("dur"))
        ));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        assert!(matches!(
            RawEntry::try_from(item("2024-01-15T09:30:00+01:00", -5)),
            Err(EntryError::NegativeDuration(-5))
        ));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let err = RawEntry::try_from(item("yesterday", 1)).unwrap_err();
        assert!(matches!(err, EntryError::InvalidTimestamp { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_null_labels_become_empty() {
        let raw = DetailItem {
            start: Some("2024-01-15T09:30:00Z".to_string()),
            dur: Some(1000),
            ..DetailItem::default()
        };
        let entry = RawEntry::try_from(raw).unwrap();
        assert_eq!(entry.client, "");
        assert_eq!(entry.project, "");
        assert_eq!(entry.description, "");
    }

    #[test]
    fn test_compact_offset_is_accepted() {
        let ts = parse_timestamp("2024-01-15T23:30:00+0100").unwrap();
        assert_eq!(
            ts.date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_entry_offset_date_uses_wall_clock_day() {
        // 23:30 at +01:00 is 22:30 UTC but also 00:30 the next day at +02:00.
        let ts = parse_timestamp("2024-01-15T23:30:00+01:00").unwrap();
        assert_eq!(
            DateBasis::EntryOffset.date_of(&ts),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            DateBasis::Zone(chrono_tz::Europe::Helsinki).date_of(&ts),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
        assert_eq!(
            DateBasis::Zone(chrono_tz::UTC).date_of(&ts),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_parses_wrapped_response() {
        let body = r#"{
            "total_count": 2,
            "per_page": 50,
            "data": [
                {"id": 1, "start": "2024-01-15T09:00:00+01:00", "end": "2024-01-15T09:10:00+01:00",
                 "client": "Acme", "project": "Website", "description": "Design", "dur": 600000},
                {"id": 2, "start": "2024-01-15T10:00:00+01:00",
                 "client": null, "project": "Admin", "description": "Email", "dur": 300000}
            ]
        }"#;
        let entries = parse_detail_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].client, "");
        assert_eq!(entries[1].duration_ms, 300_000);
    }

    #[test]
    fn test_parses_bare_array() {
        let body = r#"[{"start": "2024-01-15T09:00:00Z", "dur": 1000}]"#;
        assert_eq!(parse_detail_response(body).unwrap().len(), 1);
    }

    #[test]
    fn test_reports_index_of_bad_item() {
        let body = r#"[{"start": "2024-01-15T09:00:00Z", "dur": 1000}, {"start": "2024-01-15T09:00:00Z"}]"#;
        let err = parse_detail_response(body).unwrap_err();
        assert!(matches!(err, EntryError::Item { index: 1, .. }));
        assert_eq!(err.to_string(), "item 1: entry is missing required field `dur`");
    }

    #[test]
    fn test_item_error_message_is_not_repeated_in_chain() {
        let body = r#"[{"dur": 1000}]"#;
        let err = parse_detail_response(body).unwrap_err();
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(
            err.to_string().matches("missing required field").count(),
            1
        );
    }
}
