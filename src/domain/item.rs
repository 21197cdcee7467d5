use crate::{
    error::{Result, SyncError},
    store::path::{is_valid_segment, StorePath},
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Store-assigned key of a clipboard item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Takes the last segment of an item's store path
    pub fn from_path(path: &StorePath) -> Result<Self> {
        path.key()
            .ok_or_else(|| SyncError::InvalidItemId(path.to_string()))?
            .parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        if is_valid_segment(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(SyncError::InvalidItemId(s.to_string()))
        }
    }
}

impl TryFrom<String> for ItemId {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        if is_valid_segment(&value) {
            Ok(Self(value))
        } else {
            Err(SyncError::InvalidItemId(value))
        }
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The value stored under an item's key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub content: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl ItemRecord {
    /// A record stamped with the current time at millisecond precision
    pub fn new(content: String) -> Self {
        Self {
            content,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// One clipboard entry as presented to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardItem {
    pub id: ItemId,
    pub content: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl ClipboardItem {
    pub fn new(id: ItemId, content: String) -> Self {
        Self::from_record(id, ItemRecord::new(content))
    }

    pub fn from_record(id: ItemId, record: ItemRecord) -> Self {
        Self {
            id,
            content: record.content,
            created_at: record.created_at,
        }
    }

    /// Creation time in the stored wire format, e.g. `2026-10-18T09:30:00.123Z`
    pub fn created_at_iso(&self) -> String {
        iso8601::format(&self.created_at)
    }
}

/// ISO-8601 timestamps as written by browsers: millisecond precision, `Z` suffix
pub mod iso8601 {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parses RFC 3339 timestamps, plus the offset-less and date-only forms browsers accept as UTC
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_wire_format() {
        let record = ItemRecord {
            content: "hello".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"content": "hello", "createdAt": "2026-10-18T09:30:00.000Z"})
        );
    }

    #[test]
    fn test_record_from_browser_json() {
        let record: ItemRecord = serde_json::from_value(json!({
            "content": "pasted",
            "createdAt": "2024-05-01T12:00:00.250Z"
        }))
        .unwrap();
        assert_eq!(record.content, "pasted");
        assert_eq!(record.created_at.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_record_rejects_bad_timestamp() {
        let result = serde_json::from_value::<ItemRecord>(json!({
            "content": "x",
            "createdAt": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_record_has_millisecond_precision() {
        let record = ItemRecord::new("x".to_string());
        assert_eq!(record.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        let round_trip: ItemRecord =
            serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(round_trip, record);
    }

    #[test]
    fn test_parse_accepted_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(iso8601::parse("2024-01-02T00:00:00Z"), Some(expected));
        assert_eq!(iso8601::parse("2024-01-02T02:00:00+02:00"), Some(expected));
        assert_eq!(iso8601::parse("2024-01-02T00:00:00.000"), Some(expected));
        assert_eq!(iso8601::parse("2024-01-02"), Some(expected));
        assert_eq!(iso8601::parse("not a date"), None);
    }

    #[test]
    fn test_item_id_validation() {
        assert!("-NxYz012345abcdefghi".parse::<ItemId>().is_ok());
        assert!(matches!("a.b".parse::<ItemId>(), Err(SyncError::InvalidItemId(_))));
        assert!("".parse::<ItemId>().is_err());

        let path = StorePath::parse("clipboards/b/items/k1").unwrap();
        assert_eq!(ItemId::from_path(&path).unwrap().as_str(), "k1");
        assert!(ItemId::from_path(&StorePath::root()).is_err());
    }

    #[test]
    fn test_clipboard_item_serializes_camel_case() {
        let item = ClipboardItem::from_record(
            "k1".parse().unwrap(),
            ItemRecord {
                content: "c".to_string(),
                created_at: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
            },
        );
        assert_eq!(item.created_at_iso(), "2025-03-04T05:06:07.000Z");
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"id": "k1", "content": "c", "createdAt": "2025-03-04T05:06:07.000Z"})
        );
    }
}
