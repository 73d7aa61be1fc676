use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{ApartmentFeatures, Category};

/// A stored prediction, flat on the wire: feature fields sit next to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    #[serde(flatten)]
    pub features: ApartmentFeatures,
    pub prediction_result: i64,
    pub model_used: String,
    #[serde(deserialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// One formatted line of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: i64,
    pub timestamp: String,
    pub model: String,
    pub price: String,
    pub size: f64,
    pub rooms: u32,
    pub category: Option<Category>,
    pub category_label: String,
}

// The data service writes naive UTC datetimes; RFC 3339 is accepted too.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp `{}`: {}", raw, e)))
}
