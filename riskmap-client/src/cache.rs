//! Client synchronization cache
//!
//! Bounded, deduplicated, filter-aware mirrors of the server's report and
//! prediction streams. Both lists are most-recent-first, unique by id,
//! capped at [`MAX_ITEMS`].
//!
//! The visible predictions list always reflects the active filter: a
//! filter change replaces it wholesale with a fresh query result, and
//! every incrementally applied item is filter-checked at insertion time.

use riskmap_common::events::{FeedEvent, InitSnapshot};
use riskmap_common::filter::{matches, FilterCriteria};
use riskmap_common::model::{Prediction, Report};

/// Retention bound for each mirrored list.
pub const MAX_ITEMS: usize = 120;

#[derive(Debug, Default)]
pub struct SyncCache {
    reports: Vec<Report>,
    predictions: Vec<Prediction>,
    filters: FilterCriteria,
}

impl SyncCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Activate a new filter set.
    ///
    /// Live events arriving after this point are judged against the new
    /// filter. The caller is expected to follow up with a fresh query and
    /// [`replace_predictions`](Self::replace_predictions) — a filter
    /// change is a hard refresh, not an incremental re-filter.
    pub fn set_filters(&mut self, filters: FilterCriteria) {
        self.filters = filters;
    }

    /// Replace the predictions list outright with a fresh query result.
    pub fn replace_predictions(&mut self, predictions: Vec<Prediction>) {
        self.predictions = predictions;
        self.predictions.truncate(MAX_ITEMS);
    }

    /// Merge the one-time init snapshot into the local lists.
    ///
    /// Snapshot entries take priority by coming first in the merge order;
    /// duplicates keep the first occurrence. Snapshot predictions that
    /// fail the active filter are dropped before dedup and truncation.
    pub fn apply_init(&mut self, snapshot: InitSnapshot) {
        let existing_reports = std::mem::take(&mut self.reports);
        for report in snapshot.reports.into_iter().chain(existing_reports) {
            if !self.reports.iter().any(|r| r.id == report.id) {
                self.reports.push(report);
            }
        }
        self.reports.truncate(MAX_ITEMS);

        let existing_predictions = std::mem::take(&mut self.predictions);
        for prediction in snapshot.predictions.into_iter().chain(existing_predictions) {
            if matches(&prediction, &self.filters)
                && !self.predictions.iter().any(|p| p.id == prediction.id)
            {
                self.predictions.push(prediction);
            }
        }
        self.predictions.truncate(MAX_ITEMS);
    }

    /// Prepend a pushed report unless it is already present.
    ///
    /// Returns whether the cache changed; re-applying the same event is a
    /// no-op.
    pub fn apply_new_report(&mut self, report: Report) -> bool {
        if self.reports.iter().any(|r| r.id == report.id) {
            return false;
        }
        self.reports.insert(0, report);
        self.reports.truncate(MAX_ITEMS);
        true
    }

    /// Prepend a pushed prediction if it passes the active filter and is
    /// not already present.
    ///
    /// A prediction the filter excludes is ignored entirely: not inserted
    /// and not counted toward the cap.
    pub fn apply_new_prediction(&mut self, prediction: Prediction) -> bool {
        if !matches(&prediction, &self.filters) {
            return false;
        }
        if self.predictions.iter().any(|p| p.id == prediction.id) {
            return false;
        }
        self.predictions.insert(0, prediction);
        self.predictions.truncate(MAX_ITEMS);
        true
    }

    /// Route one feed event into the cache.
    pub fn apply_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Init(snapshot) => self.apply_init(snapshot),
            FeedEvent::ReportNew(report) => {
                self.apply_new_report(report);
            }
            FeedEvent::PredictionNew(prediction) => {
                self.apply_new_prediction(prediction);
            }
        }
    }
}
