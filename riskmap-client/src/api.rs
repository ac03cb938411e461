//! REST API client
//!
//! Thin reqwest wrapper over the server's request/response surface.
//! Non-success responses are decoded into the server's `{message}` shape
//! so submission errors can be surfaced to the user verbatim.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use riskmap_common::filter::FilterCriteria;
use riskmap_common::model::{NewReport, Prediction, Report};

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch predictions matching the criteria. Unconstrained entries are
    /// omitted from the query string.
    pub async fn fetch_predictions(&self, filters: &FilterCriteria) -> Result<Vec<Prediction>> {
        let response = self
            .http
            .get(format!("{}/api/predictions", self.base_url))
            .query(&filters.to_query_pairs())
            .send()
            .await?;
        let envelope: DataEnvelope<Prediction> = decode(response).await?;
        Ok(envelope.data)
    }

    /// Fetch all retained reports, most recent first.
    pub async fn fetch_reports(&self) -> Result<Vec<Report>> {
        let response = self
            .http
            .get(format!("{}/api/reports", self.base_url))
            .send()
            .await?;
        let envelope: DataEnvelope<Report> = decode(response).await?;
        Ok(envelope.data)
    }

    /// Submit a citizen report, returning the stored record.
    pub async fn submit_report(&self, report: &NewReport) -> Result<Report> {
        let response = self
            .http
            .post(format!("{}/api/reports", self.base_url))
            .json(report)
            .send()
            .await?;
        decode(response).await
    }
}

/// Decode a success body, or surface the server's error message.
///
/// An undecodable success body is a [`Error::Decode`]; an error status
/// whose body lacks the `{message}` shape falls back to the status line.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|body| body.message)
        .unwrap_or_else(|_| status.to_string());
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
