//! Cache key builder
//!
//! Keys are shared with the external refresh job, so they are not versioned:
//! changing one here without changing the writer breaks the dashboard.

use crate::core::constants::{CACHE_KEY_PLOTS, CACHE_KEY_TIMESTAMP, CACHE_KEY_TRENDING};
use crate::domain::{CommentScope, Product};

/// Builder for the keys the dashboard reads
pub struct CacheKey;

impl CacheKey {
    /// Last refresh timestamp
    pub fn timestamp() -> &'static str {
        CACHE_KEY_TIMESTAMP
    }

    /// Cases for a product, keyed by the product's case-source identifier
    pub fn cases(product: Product) -> String {
        format!("cases:{}", product.case_source_id())
    }

    /// Per-product comment groups for one comment scope
    pub fn comments(scope: CommentScope) -> String {
        format!("comments:{}", scope.as_str())
    }

    /// Cards labeled as trending in the current quarter
    pub fn trending_cards() -> &'static str {
        CACHE_KEY_TRENDING
    }

    /// Named summary plot series
    pub fn plots() -> &'static str {
        CACHE_KEY_PLOTS
    }

    /// Day-keyed statistics history for a case type
    pub fn stats_history(case_type: Product) -> String {
        format!("{}_stats", case_type.as_str())
    }

    /// Current statistics summary for a case type
    pub fn stats_summary(case_type: Product) -> String {
        format!("{}_summary", case_type.as_str())
    }
}
