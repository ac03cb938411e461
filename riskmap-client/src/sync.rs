//! Synchronization controller
//!
//! Ties the local cache to the REST client. Its main job beyond plumbing
//! is the stale-response guard: a query started under an old filter but
//! completing after a newer filter change must not overwrite the newer
//! filter's view, so every query carries the filter generation it was
//! issued under and results from superseded generations are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use riskmap_common::events::FeedEvent;
use riskmap_common::filter::FilterCriteria;
use riskmap_common::model::{NewReport, Prediction, Report};

use crate::api::ApiClient;
use crate::cache::SyncCache;
use crate::error::Result;

pub struct SyncController {
    cache: Mutex<SyncCache>,
    api: ApiClient,
    generation: AtomicU64,
}

impl SyncController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            cache: Mutex::new(SyncCache::new()),
            api,
            generation: AtomicU64::new(0),
        }
    }

    /// Activate a new filter set and refresh the predictions list.
    ///
    /// The filter takes effect immediately for live events; the list is
    /// then replaced by a fresh query. If another filter change lands
    /// while the query is in flight, this query's result is stale and is
    /// dropped. A failed query leaves prior state untouched.
    pub async fn change_filters(&self, filters: FilterCriteria) -> Result<()> {
        let generation = self.begin_filter_change(filters.clone());
        let result = self.api.fetch_predictions(&filters).await;
        self.finish_filter_change(generation, result)
    }

    /// Activate the filter and stamp the query about to be issued with
    /// the new generation. Live events use the new filter immediately.
    fn begin_filter_change(&self, filters: FilterCriteria) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_cache().set_filters(filters);
        generation
    }

    /// Apply a query result unless a newer filter change superseded it.
    fn finish_filter_change(
        &self,
        generation: u64,
        result: Result<Vec<Prediction>>,
    ) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale prediction response (filters changed again)");
            return Ok(());
        }

        match result {
            Ok(predictions) => {
                self.lock_cache().replace_predictions(predictions);
                Ok(())
            }
            Err(e) => {
                warn!("prediction query failed, keeping previous state: {e}");
                Err(e)
            }
        }
    }

    /// Refresh the mirrored report list from the server.
    pub async fn refresh_reports(&self) -> Result<()> {
        let reports = self.api.fetch_reports().await?;
        let mut cache = self.lock_cache();
        for report in reports.into_iter().rev() {
            cache.apply_new_report(report);
        }
        Ok(())
    }

    /// Submit a report; on success the stored record enters the local
    /// mirror without waiting for its broadcast echo.
    pub async fn submit_report(&self, report: &NewReport) -> Result<Report> {
        let stored = self.api.submit_report(report).await?;
        self.lock_cache().apply_new_report(stored.clone());
        Ok(stored)
    }

    /// Apply one pushed feed event.
    pub fn apply_event(&self, event: FeedEvent) {
        self.lock_cache().apply_event(event);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.lock_cache().reports().to_vec()
    }

    pub fn predictions(&self) -> Vec<Prediction> {
        self.lock_cache().predictions().to_vec()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, SyncCache> {
        self.cache.lock().expect("sync cache lock poisoned")
    }
}
