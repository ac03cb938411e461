//! Riskmap headless client - Main entry point
//!
//! Connects to a riskmap server, mirrors its report and prediction
//! streams into local caches, and logs what it sees. Useful for watching
//! a deployment's live feed without a browser.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riskmap_client::api::ApiClient;
use riskmap_client::sse;
use riskmap_client::sync::SyncController;
use riskmap_common::filter::FilterCriteria;

/// Command-line arguments for riskmap-client
#[derive(Parser, Debug)]
#[command(name = "riskmap-client")]
#[command(about = "Headless mirror of a riskmap server's live feed")]
#[command(version)]
struct Args {
    /// Base URL of the riskmap server
    #[arg(short, long, default_value = "http://localhost:4000", env = "RISKMAP_SERVER_URL")]
    server_url: String,

    /// Seconds to wait before reconnecting a dropped event stream
    #[arg(long, default_value = "5", env = "RISKMAP_RECONNECT_SECONDS")]
    reconnect_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskmap_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let controller = Arc::new(SyncController::new(ApiClient::new(&args.server_url)));

    // Seed the mirror over request/response before joining the live feed
    if let Err(e) = controller.change_filters(FilterCriteria::default()).await {
        warn!("initial prediction fetch failed: {e}");
    }
    if let Err(e) = controller.refresh_reports().await {
        warn!("initial report fetch failed: {e}");
    }
    info!(
        reports = controller.reports().len(),
        predictions = controller.predictions().len(),
        "initial sync complete"
    );

    loop {
        let apply = {
            let controller = Arc::clone(&controller);
            move |event| {
                controller.apply_event(event);
                info!(
                    reports = controller.reports().len(),
                    predictions = controller.predictions().len(),
                    "cache updated"
                );
            }
        };

        match sse::run_event_loop(&args.server_url, apply).await {
            Ok(()) => warn!("event stream closed by server"),
            Err(e) => warn!("event stream failed: {e}"),
        }
        tokio::time::sleep(Duration::from_secs(args.reconnect_seconds)).await;
        info!("reconnecting to event stream");
    }
}
