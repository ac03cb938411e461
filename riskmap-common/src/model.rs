//! Canonical record types shared by server and client
//!
//! Wire format is camelCase JSON, matching what map clients consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder for enumerated fields an external source left unresolved.
pub const UNKNOWN: &str = "desconocido";

/// Placeholder road segment label.
pub const UNKNOWN_SEGMENT: &str = "Segmento desconocido";

/// A single risk estimate for a road segment at a given date/hour.
///
/// Predictions are ephemeral: regenerated or refetched, never persisted,
/// and immutable once created. Coordinates may be absent when the external
/// source carried none; such records are kept (list views still show them)
/// but cannot be placed on a map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Opaque identifier, stable across the record's lifetime
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Normalized risk in [0, 1]
    pub risk_score: f64,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Time of day, HH:MM; only the hour component participates in filtering
    pub hour: String,
    /// "lluvia" | "no_lluvia" | "desconocido"
    pub weather: String,
    /// "dia" | "noche" | "desconocido"
    pub period: String,
    pub road_segment: String,
}

/// Citizen-reported incident severity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Alta,
    #[default]
    Media,
    Baja,
}

impl Severity {
    /// Parse a wire value; `None` for anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alta" => Some(Self::Alta),
            "media" => Some(Self::Media),
            "baja" => Some(Self::Baja),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alta => "alta",
            Self::Media => "media",
            Self::Baja => "baja",
        }
    }
}

/// A citizen-submitted incident record.
///
/// Server-authoritative: id and createdAt are assigned at creation and
/// never change; description is stored trimmed and is never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Report submission payload, before the server assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_defaults_to_media() {
        assert_eq!(Severity::default(), Severity::Media);
    }

    #[test]
    fn severity_parses_known_values_only() {
        assert_eq!(Severity::parse("alta"), Some(Severity::Alta));
        assert_eq!(Severity::parse("baja"), Some(Severity::Baja));
        assert_eq!(Severity::parse("critical"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn prediction_serializes_camel_case() {
        let p = Prediction {
            id: "p1".to_string(),
            latitude: Some(14.63),
            longitude: Some(-90.50),
            risk_score: 0.8,
            date: "2024-05-01".to_string(),
            hour: "08:00".to_string(),
            weather: "lluvia".to_string(),
            period: "dia".to_string(),
            road_segment: "Segmento 4".to_string(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["riskScore"], 0.8);
        assert_eq!(json["roadSegment"], "Segmento 4");
    }

    #[test]
    fn prediction_omits_missing_coordinates() {
        let p = Prediction {
            id: "p2".to_string(),
            latitude: None,
            longitude: None,
            risk_score: 0.0,
            date: String::new(),
            hour: String::new(),
            weather: UNKNOWN.to_string(),
            period: UNKNOWN.to_string(),
            road_segment: UNKNOWN_SEGMENT.to_string(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("latitude").is_none());
        assert!(json.get("longitude").is_none());
    }
}
