//! Domain error types

use thiserror::Error;

use super::types::Product;
use crate::data::cache::CacheError;

/// Errors surfaced by the stats reshaper and product lookups.
///
/// Missing cache data is not an error anywhere in the domain; it is reported
/// as a miss and degrades to an empty result.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Input validation failure; the message is shown to the user verbatim
    #[error("unknown card type: {0}")]
    UnknownCaseType(String),

    /// A day record lacks a field or holds a value that is not a count
    #[error("stats record for {day} is malformed: {reason}")]
    UpstreamDataShape { day: String, reason: String },

    /// The history blob is not a day-keyed object
    #[error("stats history for {0} is not a day-keyed object")]
    MalformedHistory(Product),

    #[error("Cache read failed: {0}")]
    Cache(#[from] CacheError),
}

impl DashboardError {
    /// Whether the upstream store holds data the dashboard refuses to chart
    pub fn is_upstream_shape(&self) -> bool {
        matches!(
            self,
            Self::UpstreamDataShape { .. } | Self::MalformedHistory(_)
        )
    }
}
