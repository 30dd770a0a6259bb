//! Evalens - analytics for video-evaluation sessions.
//!
//! Turns raw per-criterion, per-evaluator scores and timestamped comments
//! into aggregated statistics: weighted totals, category averages,
//! inter-evaluator agreement, score histograms and comment timelines.
//!
//! The components in [`analysis`] are pure functions over the types in
//! [`models`]. They hold no state between calls and may be invoked from
//! any number of threads.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod session;

pub use error::{AnalyticsError, Result};
