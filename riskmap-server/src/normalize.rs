//! Record normalizer for external feature payloads
//!
//! Converts one heterogeneous feature record (attribute bag plus optional
//! geometry bag) into the canonical [`Prediction`] shape. External sources
//! disagree on key spelling and casing, so every canonical field probes an
//! ordered list of known alternates and takes the first usable value.
//!
//! This module never fails: each field degrades to its own fallback when
//! the source value is missing or malformed.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use riskmap_common::model::{Prediction, UNKNOWN, UNKNOWN_SEGMENT};

const ID_KEYS: &[&str] = &["id", "ID", "objectId", "OBJECTID", "guid", "GUID"];
const LATITUDE_KEYS: &[&str] = &["latitude", "Latitude", "LATITUDE"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "Longitude", "LONGITUDE"];
const GEOMETRY_Y_KEYS: &[&str] = &["y", "latitude", "Latitude"];
const GEOMETRY_X_KEYS: &[&str] = &["x", "longitude", "Longitude"];
const RISK_KEYS: &[&str] = &["riskScore", "RISK_SCORE", "risk_score", "risk", "RISK"];
const DATE_KEYS: &[&str] = &[
    "date",
    "DATE",
    "predictionDate",
    "prediction_date",
    "PredictionDate",
];
const HOUR_KEYS: &[&str] = &["hour", "HOUR", "predictionHour", "PredictionHour"];
const WEATHER_KEYS: &[&str] = &["weather", "WEATHER", "climate", "CLIMATE"];
const PERIOD_KEYS: &[&str] = &["period", "PERIOD", "timePeriod", "TIMEPERIOD"];
const SEGMENT_KEYS: &[&str] = &[
    "roadSegment",
    "ROAD_SEGMENT",
    "segment",
    "SEGMENT",
    "road_segment",
    "via",
    "VIA",
];

/// First present, non-null, non-empty value among the candidate keys.
fn extract<'a>(bag: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        match bag.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(value) => return Some(value),
        }
    }
    None
}

/// Numeric coercion: numbers pass through, numeric strings are parsed,
/// anything else silently fails.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// String coercion: Unicode canonical form (NFKC) plus trim. Non-string
/// scalars are rendered through their display form.
fn normalize_string(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(raw.nfkc().collect::<String>().trim().to_string())
}

fn normalize_lowercase(value: &Value) -> Option<String> {
    normalize_string(value).map(|s| s.to_lowercase())
}

/// Clamp a raw risk value into [0, 1].
///
/// Values above 1 are treated as percentages (divided by 100, capped at
/// 1); negatives floor at 0; unparseable input defaults to 0.
fn normalize_risk_score(raw: Option<&Value>) -> f64 {
    let Some(parsed) = raw.and_then(parse_number) else {
        return 0.0;
    };
    if parsed > 1.0 {
        (parsed / 100.0).min(1.0)
    } else if parsed < 0.0 {
        0.0
    } else {
        parsed
    }
}

/// Map one raw feature record to a canonical prediction.
///
/// The attribute bag is `feature.attributes` when present, otherwise the
/// feature itself. Geometry coordinates are consulted only when no
/// attribute-level coordinate matched. `fallback_id` identifies records
/// that carry no recognizable key of their own.
pub fn map_feature_to_prediction(feature: &Value, fallback_id: &str) -> Prediction {
    let attributes = feature.get("attributes").unwrap_or(feature);
    let geometry = feature.get("geometry").unwrap_or(&Value::Null);

    let id = extract(attributes, ID_KEYS)
        .and_then(normalize_string)
        .unwrap_or_else(|| fallback_id.to_string());

    let latitude = extract(attributes, LATITUDE_KEYS)
        .and_then(parse_number)
        .or_else(|| extract(geometry, GEOMETRY_Y_KEYS).and_then(parse_number));
    let longitude = extract(attributes, LONGITUDE_KEYS)
        .and_then(parse_number)
        .or_else(|| extract(geometry, GEOMETRY_X_KEYS).and_then(parse_number));

    let risk_score = normalize_risk_score(extract(attributes, RISK_KEYS));

    let date = extract(attributes, DATE_KEYS)
        .and_then(normalize_string)
        .unwrap_or_default();
    let hour = extract(attributes, HOUR_KEYS)
        .and_then(normalize_string)
        .unwrap_or_default();
    let weather = extract(attributes, WEATHER_KEYS)
        .and_then(normalize_lowercase)
        .unwrap_or_else(|| UNKNOWN.to_string());
    let period = extract(attributes, PERIOD_KEYS)
        .and_then(normalize_lowercase)
        .unwrap_or_else(|| UNKNOWN.to_string());
    let road_segment = extract(attributes, SEGMENT_KEYS)
        .and_then(normalize_string)
        .unwrap_or_else(|| UNKNOWN_SEGMENT.to_string());

    Prediction {
        id,
        latitude,
        longitude,
        risk_score,
        date,
        hour,
        weather,
        period,
        road_segment,
    }
}
