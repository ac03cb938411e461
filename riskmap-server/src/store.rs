//! In-memory report store
//!
//! Single source of truth for citizen reports. Bounded most-recent-N list:
//! insertion order is recency order, oldest entries drop off the tail once
//! the cap is exceeded. Mutations are synchronous under one mutex guard,
//! so readers never observe a partial write.

use std::sync::Mutex;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use riskmap_common::model::{NewReport, Report};

use crate::error::{Error, Result};

/// Retention bound: only the 50 most recent reports are kept.
pub const MAX_REPORTS: usize = 50;

/// Client-facing message for any rejected submission.
pub const INCOMPLETE_REPORT: &str = "Datos del reporte incompletos.";

/// Bounded, insertion-ordered collection of citizen reports.
pub struct ReportStore {
    reports: Mutex<Vec<Report>>,
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Validate and store a submission.
    ///
    /// Rejects non-finite coordinates and empty/whitespace-only
    /// descriptions. On success the report gets a server-assigned id and
    /// timestamp, lands at the head of the store, and the store is
    /// truncated to [`MAX_REPORTS`].
    pub fn submit(&self, submission: NewReport) -> Result<Report> {
        let description = submission.description.trim();
        if description.is_empty()
            || !submission.latitude.is_finite()
            || !submission.longitude.is_finite()
        {
            return Err(Error::Validation(INCOMPLETE_REPORT.to_string()));
        }

        let report = Report {
            id: Uuid::new_v4(),
            description: description.to_string(),
            latitude: submission.latitude,
            longitude: submission.longitude,
            severity: submission.severity.unwrap_or_default(),
            created_at: Utc::now(),
        };

        let mut reports = self.reports.lock().expect("report store lock poisoned");
        reports.insert(0, report.clone());
        reports.truncate(MAX_REPORTS);
        info!(id = %report.id, total = reports.len(), "report stored");

        Ok(report)
    }

    /// Snapshot of all retained reports, most recent first.
    pub fn list(&self) -> Vec<Report> {
        self.reports.lock().expect("report store lock poisoned").clone()
    }
}
