//! Error types for riskmap-server
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Every variant maps to an HTTP status and a client-facing
//! `{ "message": ... }` body; internal detail is logged, never leaked.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Main error type for riskmap-server
#[derive(Error, Debug)]
pub enum Error {
    /// Client input malformed; surfaced verbatim to the submitting user
    #[error("{0}")]
    Validation(String),

    /// Upstream feature-service endpoint not configured
    #[error("El endpoint de ArcGIS no está configurado.")]
    UpstreamConfig,

    /// Could not reach the upstream feature service
    #[error("No se pudo conectar con ArcGIS.")]
    UpstreamNetwork,

    /// Upstream responded with a non-success status
    #[error("ArcGIS devolvió un error al solicitar predicciones.")]
    UpstreamStatus { status: u16 },

    /// Upstream body was not usable (non-JSON, embedded error, bad shape)
    #[error("{0}")]
    UpstreamPayload(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using riskmap-server Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status this error surfaces as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamConfig => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamNetwork => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamStatus { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::UpstreamPayload(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Error::Internal(detail) => {
                error!("internal error: {detail}");
                "Error interno del servidor.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
