//! SSE event stream handler
//!
//! Each connection first receives exactly one `init` event carrying the
//! current report store snapshot and a bounded slice of the prediction
//! feed, then the live `report:new` / `prediction:new` stream. Events
//! broadcast before the connection existed are never replayed.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tracing::{debug, warn};

use riskmap_common::events::{FeedEvent, InitSnapshot};

use crate::api::server::AppContext;

/// GET /api/events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before building the snapshot so events created in between
    // are queued rather than lost.
    let mut rx = ctx.broadcaster.subscribe();
    debug!(
        "new SSE client connected, total clients: {}",
        ctx.broadcaster.client_count()
    );

    let snapshot = InitSnapshot {
        reports: ctx.store.list(),
        predictions: ctx.feed.snapshot().await,
    };

    let stream = async_stream::stream! {
        if let Some(event) = to_sse_event(&FeedEvent::Init(snapshot)) {
            yield Ok(event);
        }

        loop {
            match rx.recv().await {
                // init events belong to their own connection only
                Ok(FeedEvent::Init(_)) => continue,
                Ok(feed_event) => {
                    if let Some(event) = to_sse_event(&feed_event) {
                        yield Ok(event);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged, {skipped} events dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse_event(feed_event: &FeedEvent) -> Option<Event> {
    match feed_event.payload_json() {
        Ok(data) => Some(Event::default().event(feed_event.event_name()).data(data)),
        Err(e) => {
            warn!("failed to serialize feed event: {e}");
            None
        }
    }
}
