use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a user's time, stored as `[timestamp, seconds]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sample(#[serde(with = "timestamp")] pub DateTime<Utc>, pub f64);

impl Sample {
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn seconds(&self) -> f64 {
        self.1
    }
}

/// A user's series on one track. Samples are in insertion (chronological) order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub name: String,
    pub data: Vec<Sample>,
}

impl HistoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        HistoryRecord {
            name: name.into(),
            data: Vec::new(),
        }
    }

    /// Most recent sample, the one ranking is based on.
    pub fn latest(&self) -> Option<&Sample> {
        self.data.last()
    }
}

/// Persisted per-track document: user id -> series.
pub type HistoryDocument = BTreeMap<String, HistoryRecord>;

/// Timestamps are written as RFC 3339. Older documents hold naive ISO-8601
/// strings without an offset; those are UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}
