//! Listing records and field parsing.
//!
//! Marketplace exports disagree on field names and encodings. Each field is
//! read from a list of candidate keys, taking the first one that parses.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Keys holding a listing's price.
pub const PRICE_KEYS: [&str; 2] = ["price", "currentPrice"];
/// Keys holding a sold listing's sale time.
pub const SOLD_TIME_KEYS: [&str; 4] = ["soldDate", "endTime", "item_end_date", "ended_at"];
/// Keys holding an active listing's start time.
pub const ACTIVE_TIME_KEYS: [&str; 3] = ["startTime", "listedAt", "timestamp"];
/// Keys holding a listing identifier.
pub const ID_KEYS: [&str; 2] = ["itemId", "item_id"];

/// Numeric timestamps above this are epoch seconds; below, epoch days.
const EPOCH_SECONDS_CUTOFF: f64 = 1e10;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Which side of the book a listing represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSide {
    /// Completed sale (a print).
    Sold,
    /// Open ask.
    Active,
}

/// One normalized marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub side: ListingSide,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub listing_id: Option<String>,
    pub title: Option<String>,
}

impl Listing {
    /// Normalizes one raw item, or `None` when it has no positive price or,
    /// for sold items, no timestamp. Active items without a timestamp are
    /// stamped with `default_time`.
    pub fn from_item(
        item: &Map<String, Value>,
        side: ListingSide,
        default_time: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        let price = first_parsed(item, &PRICE_KEYS, parse_price).filter(|p| *p > 0.0)?;
        let time_keys: &[&str] = match side {
            ListingSide::Sold => &SOLD_TIME_KEYS,
            ListingSide::Active => &ACTIVE_TIME_KEYS,
        };
        let timestamp = first_parsed(item, time_keys, parse_timestamp).or(default_time)?;

        Some(Self {
            side,
            timestamp,
            price,
            listing_id: first_parsed(item, &ID_KEYS, parse_id),
            title: item.get("title").and_then(Value::as_str).map(str::to_owned),
        })
    }
}

fn first_parsed<T>(
    item: &Map<String, Value>,
    keys: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|k| item.get(*k)).find_map(parse)
}

/// Parses a price given as a number, a currency string such as `"$1,250.00"`,
/// or an object with a `value` field.
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            let cleaned = cleaned.trim();
            Decimal::from_str(cleaned)
                .ok()
                .and_then(|d| d.to_f64())
                .or_else(|| cleaned.parse::<f64>().ok())
        }
        Value::Object(map) => map.get("value").and_then(parse_price),
        _ => None,
    };
    price.filter(|p| p.is_finite())
}

/// Parses a timestamp given as an RFC 3339 / ISO-8601 string, a bare date,
/// or an epoch number (seconds above 1e10, days otherwise).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let n = n.as_f64()?;
            let millis = if n > EPOCH_SECONDS_CUTOFF {
                n * 1000.0
            } else {
                n * MILLIS_PER_DAY
            };
            DateTime::from_timestamp_millis(millis as i64)
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn parse_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(&json!(125.5)), Some(125.5));
        assert_eq!(parse_price(&json!("$1,250.00")), Some(1250.0));
        assert_eq!(parse_price(&json!({ "value": "89.99", "currency": "USD" })), Some(89.99));
        assert_eq!(parse_price(&json!("n/a")), None);
        assert_eq!(parse_price(&json!(null)), None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 13, 30, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2024-05-02T13:30:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-02T15:30:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-02 13:30:00")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!("2024-05-02")),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn test_numeric_timestamps_switch_units() {
        // 19_000 days after the epoch.
        assert_eq!(
            parse_timestamp(&json!(19_000)),
            Some(Utc.with_ymd_and_hms(2022, 1, 8, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(&json!(20_000_000_000_i64)),
            DateTime::from_timestamp(20_000_000_000, 0)
        );
    }

    #[test]
    fn test_sold_item_needs_price_and_time() {
        let good = object(json!({ "price": "$40", "soldDate": "2024-01-03", "itemId": 77 }));
        let listing = Listing::from_item(&good, ListingSide::Sold, None).unwrap();
        assert_eq!(listing.price, 40.0);
        assert_eq!(listing.listing_id.as_deref(), Some("77"));

        let no_time = object(json!({ "price": 40 }));
        assert!(Listing::from_item(&no_time, ListingSide::Sold, None).is_none());

        let free = object(json!({ "price": 0, "soldDate": "2024-01-03" }));
        assert!(Listing::from_item(&free, ListingSide::Sold, None).is_none());
    }

    #[test]
    fn test_active_item_defaults_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let item = object(json!({ "currentPrice": 55.0, "title": "Card" }));
        let listing = Listing::from_item(&item, ListingSide::Active, Some(now)).unwrap();
        assert_eq!(listing.timestamp, now);
        assert_eq!(listing.title.as_deref(), Some("Card"));
    }
}
