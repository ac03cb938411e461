//! Filter criteria and the shared filter predicate
//!
//! The same predicate runs on the server (query filtering) and on the
//! client (live event acceptance), so a client filtering pushed events
//! locally sees exactly what a fresh query would return.

use serde::{Deserialize, Serialize};

use crate::model::Prediction;

/// Sentinel value for weather/period meaning "no constraint".
pub const ALL: &str = "todos";

/// Optional constraint set narrowing which predictions are relevant.
///
/// A value object: no identity, compared by field equality. Empty strings
/// are treated the same as absent constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub date: Option<String>,
    pub hour: Option<String>,
    pub weather: Option<String>,
    pub period: Option<String>,
}

impl FilterCriteria {
    /// Query-string entries for a request, omitting unconstrained fields.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = constrained(&self.date) {
            pairs.push(("date", date.to_string()));
        }
        if let Some(hour) = constrained(&self.hour) {
            pairs.push(("hour", hour.to_string()));
        }
        if let Some(weather) = constrained(&self.weather) {
            pairs.push(("weather", weather.to_string()));
        }
        if let Some(period) = constrained(&self.period) {
            pairs.push(("period", period.to_string()));
        }
        pairs
    }
}

/// Returns the constraint value unless it is absent, empty, or the
/// "todos" sentinel.
fn constrained(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        None | Some("") | Some(ALL) => None,
        Some(v) => Some(v),
    }
}

/// Hour component of an "HH:MM"-style string, as an integer.
fn hour_component(value: &str) -> Option<u32> {
    value.split(':').next()?.trim().parse().ok()
}

/// Decide whether a prediction satisfies every active constraint.
///
/// Conjunctive and order-independent. The hour constraint compares only
/// the hour component; minutes are ignored. Weather and period use exact
/// equality and are bypassed when unconstrained.
pub fn matches(prediction: &Prediction, filters: &FilterCriteria) -> bool {
    if let Some(date) = constrained(&filters.date) {
        if prediction.date != date {
            return false;
        }
    }
    if let Some(hour) = constrained(&filters.hour) {
        match (hour_component(hour), hour_component(&prediction.hour)) {
            (Some(wanted), Some(actual)) if wanted == actual => {}
            // either side unparseable means no match on this clause
            _ => return false,
        }
    }
    if let Some(weather) = constrained(&filters.weather) {
        if prediction.weather != weather {
            return false;
        }
    }
    if let Some(period) = constrained(&filters.period) {
        if prediction.period != period {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction() -> Prediction {
        Prediction {
            id: "p1".to_string(),
            latitude: Some(14.6),
            longitude: Some(-90.5),
            risk_score: 0.7,
            date: "2024-05-01".to_string(),
            hour: "08:30".to_string(),
            weather: "lluvia".to_string(),
            period: "dia".to_string(),
            road_segment: "Segmento 3".to_string(),
        }
    }

    fn criteria(
        date: Option<&str>,
        hour: Option<&str>,
        weather: Option<&str>,
        period: Option<&str>,
    ) -> FilterCriteria {
        FilterCriteria {
            date: date.map(String::from),
            hour: hour.map(String::from),
            weather: weather.map(String::from),
            period: period.map(String::from),
        }
    }

    #[test]
    fn empty_criteria_match_everything() {
        assert!(matches(&prediction(), &FilterCriteria::default()));
    }

    #[test]
    fn date_requires_exact_equality() {
        assert!(matches(&prediction(), &criteria(Some("2024-05-01"), None, None, None)));
        assert!(!matches(&prediction(), &criteria(Some("2024-05-02"), None, None, None)));
    }

    #[test]
    fn hour_compares_hour_component_only() {
        // prediction hour is 08:30; 08:00 matches, 09:30 does not
        assert!(matches(&prediction(), &criteria(None, Some("08:00"), None, None)));
        assert!(matches(&prediction(), &criteria(None, Some("8"), None, None)));
        assert!(!matches(&prediction(), &criteria(None, Some("09:30"), None, None)));
    }

    #[test]
    fn unparseable_hour_never_matches() {
        assert!(!matches(&prediction(), &criteria(None, Some("mediodia"), None, None)));

        // an hourless prediction fails any active hour constraint, even one
        // that is itself unparseable
        let mut hourless = prediction();
        hourless.hour = String::new();
        assert!(!matches(&hourless, &criteria(None, Some("08:00"), None, None)));
        assert!(!matches(&hourless, &criteria(None, Some("mediodia"), None, None)));
        // with no hour constraint it still matches
        assert!(matches(&hourless, &FilterCriteria::default()));
    }

    #[test]
    fn todos_sentinel_bypasses_weather_and_period() {
        assert!(matches(&prediction(), &criteria(None, None, Some(ALL), Some(ALL))));
        assert!(matches(&prediction(), &criteria(None, None, Some(""), None)));
    }

    #[test]
    fn weather_and_period_are_conjunctive() {
        assert!(matches(&prediction(), &criteria(None, None, Some("lluvia"), Some("dia"))));
        assert!(!matches(&prediction(), &criteria(None, None, Some("lluvia"), Some("noche"))));
        assert!(!matches(&prediction(), &criteria(None, None, Some("no_lluvia"), Some("dia"))));
        // relaxing weather keeps the period constraint active
        assert!(!matches(&prediction(), &criteria(None, None, Some(ALL), Some("noche"))));
    }

    #[test]
    fn query_pairs_omit_unconstrained_entries() {
        let f = criteria(Some("2024-05-01"), None, Some(ALL), Some("noche"));
        let pairs = f.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("date", "2024-05-01".to_string()),
                ("period", "noche".to_string())
            ]
        );
    }
}
