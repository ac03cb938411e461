//! Prediction feed
//!
//! The set of currently known predictions, behind one two-operation
//! contract (`query` for filtered reads, `snapshot` for the init payload
//! of a connecting client) with two interchangeable strategies:
//!
//! - **Synthetic**: a bounded in-process working set, seeded at startup
//!   and grown by a periodic generator tick. Queries filter in memory and
//!   never broadcast.
//! - **Proxy**: every query delegates to the ArcGIS collaborator; the
//!   handler may re-broadcast each fetched batch to the live feed.
//!
//! A server process runs exactly one strategy; the tick task only exists
//! in synthetic mode.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use riskmap_common::events::FeedEvent;
use riskmap_common::filter::{matches, FilterCriteria};
use riskmap_common::model::Prediction;

use crate::arcgis::ArcgisClient;
use crate::error::Result;
use crate::generate::{create_prediction, initial_predictions};
use crate::sse::Broadcaster;

/// Synthetic working-set cap; oldest entries are evicted first.
pub const MAX_PREDICTIONS: usize = 200;

/// How much recent feed history a connecting client receives.
pub const SNAPSHOT_SLICE: usize = 30;

pub enum PredictionFeed {
    Synthetic(SyntheticFeed),
    Proxy(ArcgisClient),
}

impl PredictionFeed {
    pub fn synthetic() -> Self {
        Self::Synthetic(SyntheticFeed::seeded())
    }

    pub fn proxy(client: ArcgisClient) -> Self {
        Self::Proxy(client)
    }

    /// Whether queries reach out to the external collaborator.
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Proxy(_))
    }

    /// Predictions matching the given criteria.
    ///
    /// Synthetic mode filters the working set in memory and cannot fail;
    /// proxy mode surfaces the classified upstream error.
    pub async fn query(&self, filters: &FilterCriteria) -> Result<Vec<Prediction>> {
        match self {
            Self::Synthetic(feed) => Ok(feed.filtered(filters)),
            Self::Proxy(client) => client.fetch_predictions(filters).await,
        }
    }

    /// Recent predictions for a connecting client's init snapshot.
    ///
    /// Proxy-mode fetch failures degrade to an empty list so a broken
    /// upstream never refuses the connection.
    pub async fn snapshot(&self) -> Vec<Prediction> {
        match self {
            Self::Synthetic(feed) => feed.recent(SNAPSHOT_SLICE),
            Self::Proxy(client) => match client.fetch_predictions(&FilterCriteria::default()).await
            {
                Ok(predictions) => predictions,
                Err(e) => {
                    debug!("init snapshot fetch degraded to empty: {e}");
                    Vec::new()
                }
            },
        }
    }
}

/// Bounded in-memory working set for demo mode.
pub struct SyntheticFeed {
    predictions: Mutex<VecDeque<Prediction>>,
}

impl SyntheticFeed {
    pub fn seeded() -> Self {
        Self {
            predictions: Mutex::new(initial_predictions().into()),
        }
    }

    /// An empty working set; useful for tests that need known contents.
    pub fn empty() -> Self {
        Self {
            predictions: Mutex::new(VecDeque::new()),
        }
    }

    /// Append one prediction, evicting the oldest past the cap.
    pub fn append(&self, prediction: Prediction) {
        let mut predictions = self.predictions.lock().expect("feed lock poisoned");
        predictions.push_back(prediction);
        while predictions.len() > MAX_PREDICTIONS {
            predictions.pop_front();
        }
    }

    /// Working-set entries matching the criteria, in insertion order.
    pub fn filtered(&self, filters: &FilterCriteria) -> Vec<Prediction> {
        self.predictions
            .lock()
            .expect("feed lock poisoned")
            .iter()
            .filter(|p| matches(p, filters))
            .cloned()
            .collect()
    }

    /// The `count` most recent entries, oldest of the slice first.
    pub fn recent(&self, count: usize) -> Vec<Prediction> {
        let predictions = self.predictions.lock().expect("feed lock poisoned");
        let skip = predictions.len().saturating_sub(count);
        predictions.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.predictions.lock().expect("feed lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn the demo-mode generator tick.
///
/// Every `interval`, one synthetic prediction is appended to the working
/// set and broadcast as `prediction:new`. Only called in synthetic mode,
/// so the tick and the external-fetch path are never active in the same
/// process.
pub fn spawn_tick_task(
    feed: Arc<PredictionFeed>,
    broadcaster: Broadcaster,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!("synthetic prediction tick every {interval:?}");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let offset = rand::thread_rng().gen_range(0..5);
            let prediction = create_prediction(offset);
            if let PredictionFeed::Synthetic(synthetic) = feed.as_ref() {
                synthetic.append(prediction.clone());
            }
            broadcaster.broadcast_lossy(FeedEvent::PredictionNew(prediction));
        }
    })
}
