//! Realtime feed event types
//!
//! Events carried on the server's broadcast channel and over the SSE wire.
//! The wire payload is the bare record (or snapshot object), with the kind
//! carried in the SSE `event:` field, so map clients can subscribe by name.

use serde::{Deserialize, Serialize};

use crate::model::{Prediction, Report};

/// One-time payload sent to a newly connected client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InitSnapshot {
    pub reports: Vec<Report>,
    pub predictions: Vec<Prediction>,
}

/// Feed event fanned out to connected clients.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Sent exactly once per connection, to the connecting client only
    Init(InitSnapshot),
    /// A report was created; unconditional, no filtering
    ReportNew(Report),
    /// A prediction entered the feed; clients filter on their own side
    PredictionNew(Prediction),
}

impl FeedEvent {
    /// SSE `event:` field value.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::ReportNew(_) => "report:new",
            Self::PredictionNew(_) => "prediction:new",
        }
    }

    /// SSE `data:` field value (JSON).
    pub fn payload_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Init(snapshot) => serde_json::to_string(snapshot),
            Self::ReportNew(report) => serde_json::to_string(report),
            Self::PredictionNew(prediction) => serde_json::to_string(prediction),
        }
    }

    /// Decode a wire event; `None` for event names we do not know
    /// (keep-alives, future additions).
    pub fn from_wire(event: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        Ok(match event {
            "init" => Some(Self::Init(serde_json::from_str(data)?)),
            "report:new" => Some(Self::ReportNew(serde_json::from_str(data)?)),
            "prediction:new" => Some(Self::PredictionNew(serde_json::from_str(data)?)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use chrono::Utc;
    use uuid::Uuid;

    fn report() -> Report {
        Report {
            id: Uuid::new_v4(),
            description: "Choque leve".to_string(),
            latitude: 14.63,
            longitude: -90.50,
            severity: Severity::Alta,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn report_event_round_trips_over_the_wire() {
        let event = FeedEvent::ReportNew(report());
        let data = event.payload_json().unwrap();
        let decoded = FeedEvent::from_wire(event.event_name(), &data).unwrap();
        assert_eq!(decoded, Some(event));
    }

    #[test]
    fn unknown_event_names_are_ignored() {
        assert_eq!(FeedEvent::from_wire("keep-alive", "{}").unwrap(), None);
    }

    #[test]
    fn init_payload_is_a_snapshot_object() {
        let event = FeedEvent::Init(InitSnapshot {
            reports: vec![report()],
            predictions: vec![],
        });
        let data = event.payload_json().unwrap();
        let json: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert!(json["reports"].is_array());
        assert!(json["predictions"].is_array());
    }
}
