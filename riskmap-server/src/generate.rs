//! Synthetic prediction generator for demo mode

use chrono::{Duration, Timelike, Utc};
use rand::Rng;
use uuid::Uuid;

use riskmap_common::model::Prediction;

/// Guatemala City, the demo map center.
const BASE_LATITUDE: f64 = 14.6349;
const BASE_LONGITUDE: f64 = -90.5069;

const WEATHER_OPTIONS: [&str; 2] = ["lluvia", "no_lluvia"];

/// Generate one synthetic prediction, `offset_hours` ahead of now.
pub fn create_prediction(offset_hours: i64) -> Prediction {
    let mut rng = rand::thread_rng();
    let at = Utc::now() + Duration::hours(offset_hours);

    let period = if (6..18).contains(&at.hour()) {
        "dia"
    } else {
        "noche"
    };

    Prediction {
        id: Uuid::new_v4().to_string(),
        latitude: Some(BASE_LATITUDE + rng.gen_range(-0.1..0.1)),
        longitude: Some(BASE_LONGITUDE + rng.gen_range(-0.1..0.1)),
        risk_score: rng.gen_range(50..=100) as f64 / 100.0,
        date: at.format("%Y-%m-%d").to_string(),
        hour: at.format("%H:%M").to_string(),
        weather: WEATHER_OPTIONS[rng.gen_range(0..WEATHER_OPTIONS.len())].to_string(),
        period: period.to_string(),
        road_segment: format!("Segmento {}", rng.gen_range(1..=20)),
    }
}

/// Initial working set for a freshly started synthetic feed.
pub fn initial_predictions() -> Vec<Prediction> {
    (0..15).map(create_prediction).collect()
}
