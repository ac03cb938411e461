//! Riskmap server library
//!
//! HTTP + SSE service for the traffic-risk map: serves filtered prediction
//! queries, accepts citizen reports, and fans both out to connected
//! clients in real time.

pub mod api;
pub mod arcgis;
pub mod error;
pub mod feed;
pub mod generate;
pub mod normalize;
pub mod sse;
pub mod store;

pub use error::{Error, Result};
