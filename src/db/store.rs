use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// View over the joined itinerary documents: each itinerary header record is
/// followed by that itinerary's event records, in store order.
pub const ITINERARY_VIEW: &str = "travel/itineraries_joined";
/// View over weather samples, keyed by (city, country, locale).
pub const WEATHER_VIEW: &str = "travel/weather_filtered";
/// View over recommendation pools: each pool header record is followed by
/// that pool's candidate records, in store order.
pub const RECS_VIEW: &str = "travel/recommendations";

pub const TYPE_KEY: &str = "type";
pub const SUBTYPE_KEY: &str = "subtype";

pub const ITINERARY_TYPE: &str = "itinerary";
pub const EVENT_TYPE: &str = "event";
pub const PROFILE_TYPE: &str = "profile";

/// An untyped document as it comes out of the store. The `type`/`subtype`
/// tags decide what the record becomes downstream.
pub type RawRecord = serde_json::Map<String, Value>;

pub fn record_str<'a>(record: &'a RawRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown view `{0}`")]
    UnknownView(String),
    #[error("failed to read feed `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed feed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The document store contract: ordered view reads over a key range.
pub trait DocumentStore: Send + Sync {
    fn query(
        &self,
        view: &str,
        low_key: &Value,
        high_key: &Value,
    ) -> Result<Vec<RawRecord>, StoreError>;
}

#[derive(Deserialize)]
struct FeedDocument {
    views: HashMap<String, Vec<RawRecord>>,
}

/// A [`DocumentStore`] backed by a JSON document of pre-ordered views. This
/// is the fixed data feed the sample deployment runs on; swapping in a live
/// store only requires honoring the same view contract.
pub struct JsonFeedStore {
    views: HashMap<String, Vec<RawRecord>>,
}

impl JsonFeedStore {
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let document: FeedDocument = serde_json::from_str(json)?;
        Ok(Self {
            views: document.views,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|source| StoreError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// The fixture indexes on the scalar components of the key: every string in
/// the low key must match one of the record's locale/city/country fields.
/// Records carrying none of those fields match unconditionally.
fn matches_key(record: &RawRecord, needle: &str) -> bool {
    let mut saw_field = false;
    for field in ["locale", "city", "country"] {
        if let Some(value) = record_str(record, field) {
            saw_field = true;
            if value == needle {
                return true;
            }
        }
    }
    !saw_field
}

impl DocumentStore for JsonFeedStore {
    fn query(
        &self,
        view: &str,
        low_key: &Value,
        _high_key: &Value,
    ) -> Result<Vec<RawRecord>, StoreError> {
        let records = self
            .views
            .get(view)
            .ok_or_else(|| StoreError::UnknownView(view.to_string()))?;

        let needles: Vec<&str> = match low_key {
            Value::Array(parts) => parts.iter().filter_map(Value::as_str).collect(),
            Value::String(s) => vec![s.as_str()],
            _ => Vec::new(),
        };

        Ok(records
            .iter()
            .filter(|record| needles.iter().all(|needle| matches_key(record, needle)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> JsonFeedStore {
        JsonFeedStore::from_json_str(
            r#"{
                "views": {
                    "travel/itineraries_joined": [
                        { "type": "itinerary", "id": "a", "locale": "en" },
                        { "type": "event", "id": "b", "locale": "en" },
                        { "type": "itinerary", "id": "c", "locale": "de" }
                    ]
                }
            }"#,
        )
        .expect("feed parses")
    }

    #[test]
    fn query_filters_on_the_locale_component() {
        let records = store()
            .query(ITINERARY_VIEW, &json!(["en", 0]), &json!(["en", 1]))
            .expect("query");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| record_str(r, "locale") == Some("en")));
    }

    #[test]
    fn query_preserves_feed_order() {
        let records = store()
            .query(ITINERARY_VIEW, &json!(["en", 0]), &json!(["en", 1]))
            .expect("query");
        assert_eq!(record_str(&records[0], "id"), Some("a"));
        assert_eq!(record_str(&records[1], "id"), Some("b"));
    }

    #[test]
    fn unknown_view_is_an_error() {
        assert!(store()
            .query("travel/nope", &json!([]), &json!([]))
            .is_err());
    }
}
