//! JSON export loaders.

use crate::error::IngestError;
use crate::listing::{Listing, ListingSide};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Top-level keys that may hold sold items, in lookup order.
pub const SOLD_ARRAY_KEYS: [&str; 4] = ["items", "sold", "search_results", "item"];
/// Top-level keys that may hold active items, in lookup order.
pub const ACTIVE_ARRAY_KEYS: [&str; 4] = ["items", "active", "search_results", "item"];

/// Returns the listing array of a document: the document itself when it is
/// an array, else the first non-empty array under `keys`.
fn listing_items<'a>(doc: &'a Value, keys: &[&str]) -> Result<&'a [Value], IngestError> {
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(keys
            .iter()
            .filter_map(|k| map.get(*k).and_then(Value::as_array))
            .find(|a| !a.is_empty())
            .map_or(&[][..], Vec::as_slice)),
        Value::Null => Err(IngestError::unsupported_layout("null")),
        Value::Bool(_) => Err(IngestError::unsupported_layout("a boolean")),
        Value::Number(_) => Err(IngestError::unsupported_layout("a number")),
        Value::String(_) => Err(IngestError::unsupported_layout("a string")),
    }
}

fn parse_listings(
    doc: &Value,
    keys: &[&str],
    side: ListingSide,
    default_time: Option<DateTime<Utc>>,
) -> Result<Vec<Listing>, IngestError> {
    let items = listing_items(doc, keys)?;
    let mut listings: Vec<Listing> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| Listing::from_item(item, side, default_time))
        .collect();
    listings.sort_by_key(|l| l.timestamp);

    debug!(
        side = ?side,
        items = items.len(),
        parsed = listings.len(),
        "Parsed listings"
    );
    Ok(listings)
}

/// Parses a sold-listings document, sorted by sale time.
///
/// # Errors
/// Returns [`IngestError::UnsupportedLayout`] when the document is neither an
/// array nor an object.
pub fn parse_sold(doc: &Value) -> Result<Vec<Listing>, IngestError> {
    parse_listings(doc, &SOLD_ARRAY_KEYS, ListingSide::Sold, None)
}

/// Parses an active-listings document, sorted by listing time. Items without
/// a timestamp are stamped with `now`.
///
/// # Errors
/// Returns [`IngestError::UnsupportedLayout`] when the document is neither an
/// array nor an object.
pub fn parse_active(doc: &Value, now: DateTime<Utc>) -> Result<Vec<Listing>, IngestError> {
    parse_listings(doc, &ACTIVE_ARRAY_KEYS, ListingSide::Active, Some(now))
}

fn read_json(path: &Path) -> Result<Value, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| IngestError::json(path, e))
}

/// Loads a sold-listings export.
///
/// # Errors
/// Returns an error if the file cannot be read, is not JSON, or has an
/// unsupported layout.
pub fn load_sold(path: impl AsRef<Path>) -> Result<Vec<Listing>, IngestError> {
    parse_sold(&read_json(path.as_ref())?)
}

/// Loads an active-listings export; undated items are stamped with the
/// current time.
///
/// # Errors
/// Returns an error if the file cannot be read, is not JSON, or has an
/// unsupported layout.
pub fn load_active(path: impl AsRef<Path>) -> Result<Vec<Listing>, IngestError> {
    parse_active(&read_json(path.as_ref())?, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_array() {
        let doc = json!([
            { "price": 20, "endTime": "2024-01-02T00:00:00Z" },
            { "price": 10, "endTime": "2024-01-01T00:00:00Z" },
            "not an item"
        ]);
        let listings = parse_sold(&doc).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, 10.0);
    }

    #[test]
    fn test_wrapped_arrays() {
        let doc = json!({
            "items": [],
            "sold": [{ "price": "12.50", "ended_at": "2024-01-01" }]
        });
        assert_eq!(parse_sold(&doc).unwrap().len(), 1);

        let doc = json!({ "active": [{ "price": 30 }] });
        let now = Utc::now();
        let asks = parse_active(&doc, now).unwrap();
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].timestamp, now);
        assert_eq!(asks[0].side, ListingSide::Active);
    }

    #[test]
    fn test_object_without_items_is_empty() {
        assert!(parse_sold(&json!({ "total": 0 })).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_document_rejected() {
        assert!(matches!(
            parse_sold(&json!(42)),
            Err(IngestError::UnsupportedLayout { .. })
        ));
    }
}
