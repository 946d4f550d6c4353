//! Data access layer
//!
//! - `cache` - in-memory and Redis cache backends shared with the refresh job
//! - `source` - typed, read-only accessors over the cached datasets
//! - `refresh` - trigger for the external refresh job

pub mod cache;
pub mod refresh;
pub mod source;

pub use cache::{CacheError, CacheService};
pub use refresh::{RefreshError, RefreshService};
pub use source::{CacheRead, CachedDashboardSource, DashboardSource};
