//! Riskmap server - Main entry point
//!
//! Runs in one of two mutually exclusive feed modes:
//! - `synthetic` (default): in-process generated predictions with a
//!   periodic tick feeding the live stream
//! - `proxy`: predictions fetched on demand from an ArcGIS feature service

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riskmap_server::api::{self, AppContext};
use riskmap_server::arcgis::{ArcgisClient, ArcgisConfig};
use riskmap_server::feed::{spawn_tick_task, PredictionFeed};
use riskmap_server::sse::Broadcaster;
use riskmap_server::store::ReportStore;

/// Command-line arguments for riskmap-server
#[derive(Parser, Debug)]
#[command(name = "riskmap-server")]
#[command(about = "Realtime traffic-risk map server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4000", env = "RISKMAP_PORT")]
    port: u16,

    /// Prediction feed mode: "synthetic" or "proxy"
    #[arg(short, long, default_value = "synthetic", env = "RISKMAP_FEED_MODE")]
    mode: String,

    /// Seconds between synthetic prediction ticks
    #[arg(long, default_value = "60", env = "RISKMAP_TICK_SECONDS")]
    tick_seconds: u64,

    /// Proxy mode: do not re-broadcast fetched batches to the live feed
    #[arg(long, env = "RISKMAP_NO_REBROADCAST")]
    no_rebroadcast: bool,

    /// ArcGIS predictions endpoint (proxy mode)
    #[arg(long, env = "ARCGIS_PREDICTIONS_URL")]
    arcgis_url: Option<String>,

    /// ArcGIS bearer token (proxy mode)
    #[arg(long, env = "ARCGIS_TOKEN")]
    arcgis_token: Option<String>,

    /// ArcGIS basic-auth username (proxy mode)
    #[arg(long, env = "ARCGIS_USERNAME")]
    arcgis_username: Option<String>,

    /// ArcGIS basic-auth password (proxy mode)
    #[arg(long, env = "ARCGIS_PASSWORD")]
    arcgis_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskmap_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let store = Arc::new(ReportStore::new());
    let broadcaster = Broadcaster::new(100);

    let feed = match args.mode.as_str() {
        "synthetic" => {
            info!("starting in synthetic feed mode");
            Arc::new(PredictionFeed::synthetic())
        }
        "proxy" => {
            info!("starting in ArcGIS proxy feed mode");
            let config = ArcgisConfig {
                predictions_url: args.arcgis_url.clone(),
                token: args.arcgis_token.clone(),
                username: args.arcgis_username.clone(),
                password: args.arcgis_password.clone(),
            };
            Arc::new(PredictionFeed::proxy(ArcgisClient::new(config)))
        }
        other => bail!("unknown feed mode: {other} (expected \"synthetic\" or \"proxy\")"),
    };

    // The tick task only exists in synthetic mode
    if !feed.is_proxy() {
        spawn_tick_task(
            Arc::clone(&feed),
            broadcaster.clone(),
            Duration::from_secs(args.tick_seconds),
        );
    }

    let ctx = AppContext {
        store,
        feed,
        broadcaster,
        rebroadcast_fetches: !args.no_rebroadcast,
    };

    api::server::run(ctx, args.port)
        .await
        .context("server error")?;

    Ok(())
}
