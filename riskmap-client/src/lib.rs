//! Riskmap headless sync client
//!
//! Mirrors the server's report and prediction streams into bounded,
//! deduplicated local caches, reconciling the one-time init snapshot with
//! the live SSE event stream and filter-driven queries.

pub mod api;
pub mod cache;
pub mod error;
pub mod sse;
pub mod sync;

pub use error::{Error, Result};
