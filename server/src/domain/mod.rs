//! Dashboard domain logic
//!
//! - `snapshot` - per-request fan-out of cached datasets into one view-model
//! - `stats` - day-keyed stats history reshaped into chart series
//! - `severity` - severity ordering for the table views
//! - `types` - records shared by the loader, reshaper and routes

pub mod error;
pub mod severity;
pub mod snapshot;
pub mod stats;
pub mod types;

pub use error::DashboardError;
pub use severity::{Severity, SeverityRow, severity_table};
pub use snapshot::{
    ProductComments, Snapshot, SnapshotGaps, SnapshotLoader, SnapshotPart, TrendingSnapshot,
};
pub use stats::{Metric, ReshapedSeries, StatsReport, StatsReshaper};
pub use types::{
    CardComment, CardRecord, CaseRecord, CommentGroup, CommentScope, CommentsByProduct,
    PlotSeries, Product, StatsSummary,
};
