//! ArcGIS feature-service client
//!
//! Fetches externally computed risk predictions and normalizes them into
//! the canonical shape. Failures are classified so handlers can surface a
//! meaningful status and message instead of a blanket 500.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use riskmap_common::filter::FilterCriteria;
use riskmap_common::model::Prediction;

use crate::error::{Error, Result};
use crate::normalize::map_feature_to_prediction;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Out-of-band ArcGIS configuration (endpoint plus credentials).
#[derive(Debug, Clone, Default)]
pub struct ArcgisConfig {
    pub predictions_url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct ArcgisClient {
    config: ArcgisConfig,
    http: reqwest::Client,
}

impl ArcgisClient {
    pub fn new(config: ArcgisConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Fetch and normalize predictions matching the given criteria.
    ///
    /// Filter entries that are empty or "todos" are omitted from the
    /// request. Record indices seed fallback ids for records without a
    /// recognizable key.
    pub async fn fetch_predictions(&self, filters: &FilterCriteria) -> Result<Vec<Prediction>> {
        let url = self
            .config
            .predictions_url
            .as_deref()
            .ok_or(Error::UpstreamConfig)?;

        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&filters.to_query_pairs());

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        } else if let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(|e| {
            warn!("arcgis request failed: {e}");
            Error::UpstreamNetwork
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|_| {
            Error::UpstreamPayload("La respuesta de ArcGIS no es un JSON válido.".to_string())
        })?;

        let predictions = parse_payload(&payload)?;
        debug!(count = predictions.len(), "arcgis fetch complete");
        Ok(predictions)
    }
}

/// Extract and normalize the records array from an upstream payload.
///
/// Accepts the records under `features`, `data`, or `results` (first
/// present wins). A payload-embedded `error` object is an upstream
/// failure even under a 200 status.
pub fn parse_payload(payload: &Value) -> Result<Vec<Prediction>> {
    if let Some(error) = payload.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("ArcGIS reportó un error interno.")
            .to_string();
        return Err(Error::UpstreamPayload(message));
    }

    let features = payload
        .get("features")
        .or_else(|| payload.get("data"))
        .or_else(|| payload.get("results"))
        .unwrap_or(&Value::Null);

    let Value::Array(features) = features else {
        return Err(Error::UpstreamPayload(
            "El formato de la respuesta de ArcGIS es inesperado.".to_string(),
        ));
    };

    Ok(features
        .iter()
        .enumerate()
        .map(|(index, feature)| map_feature_to_prediction(feature, &format!("arcgis-{index}")))
        .collect())
}
