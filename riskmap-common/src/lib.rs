//! # Riskmap Common Library
//!
//! Shared code for the riskmap server and client including:
//! - Canonical data model (Prediction, Report, Severity)
//! - Filter criteria and the filter predicate
//! - Realtime feed event types
//!
//! The filter predicate lives here so the server's query path and the
//! client's live event-acceptance path run the exact same code.

pub mod events;
pub mod filter;
pub mod model;

pub use events::FeedEvent;
pub use filter::{matches, FilterCriteria};
pub use model::{NewReport, Prediction, Report, Severity};
