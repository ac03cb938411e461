//! HTTP request handlers
//!
//! Implements the REST endpoints: filtered prediction queries, report
//! listing, and report submission.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use riskmap_common::events::FeedEvent;
use riskmap_common::filter::FilterCriteria;
use riskmap_common::model::{NewReport, Prediction, Report, Severity};

use crate::api::server::AppContext;
use crate::error::{Error, Result};
use crate::store::INCOMPLETE_REPORT;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionsResponse {
    data: Vec<Prediction>,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    data: Vec<Report>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "riskmap-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Predictions
// ============================================================================

/// GET /api/predictions - Filtered prediction query
///
/// In proxy mode with re-broadcasting enabled, every successfully fetched
/// record is also pushed to the live feed, so even a read-only query is a
/// write from the clients' point of view.
pub async fn get_predictions(
    State(ctx): State<AppContext>,
    Query(filters): Query<FilterCriteria>,
) -> Result<Json<PredictionsResponse>> {
    let data = ctx.feed.query(&filters).await?;

    if ctx.feed.is_proxy() && ctx.rebroadcast_fetches {
        for prediction in &data {
            ctx.broadcaster
                .broadcast_lossy(FeedEvent::PredictionNew(prediction.clone()));
        }
    }

    Ok(Json(PredictionsResponse { data }))
}

// ============================================================================
// Reports
// ============================================================================

/// GET /api/reports - All retained reports, most recent first
pub async fn get_reports(State(ctx): State<AppContext>) -> Json<ReportsResponse> {
    Json(ReportsResponse {
        data: ctx.store.list(),
    })
}

/// POST /api/reports - Submit a citizen report
///
/// The body is validated by hand from a raw JSON value so that wrong field
/// types (`latitude: "abc"`) surface the canonical validation message
/// instead of a framework rejection. On success the report is stored and
/// broadcast to every connected client, including the submitter.
pub async fn create_report(
    State(ctx): State<AppContext>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Report>)> {
    let submission = parse_submission(&body)?;
    let report = ctx.store.submit(submission)?;

    ctx.broadcaster
        .broadcast_lossy(FeedEvent::ReportNew(report.clone()));
    info!(id = %report.id, "report accepted and broadcast");

    Ok((StatusCode::CREATED, Json(report)))
}

fn parse_submission(body: &Value) -> Result<NewReport> {
    let incomplete = || Error::Validation(INCOMPLETE_REPORT.to_string());

    let description = body
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(incomplete)?;
    let latitude = body
        .get("latitude")
        .and_then(Value::as_f64)
        .ok_or_else(incomplete)?;
    let longitude = body
        .get("longitude")
        .and_then(Value::as_f64)
        .ok_or_else(incomplete)?;

    let severity = match body.get("severity") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_str()
                .and_then(Severity::parse)
                .ok_or_else(incomplete)?,
        ),
    };

    Ok(NewReport {
        description: description.to_string(),
        latitude,
        longitude,
        severity,
    })
}
