//! Dashboard snapshot loading
//!
//! One request builds one [`Snapshot`]: every dataset the page needs is read
//! concurrently, then assembled into an immutable value. Loading never fails.
//! Absent data becomes an empty field and is listed in [`SnapshotGaps`].
//!
//! Snapshots are not refresh-atomic. The refresh timestamp is read before and
//! after the fan-out; a refresh landing in between yields `consistent: false`.
//! When either timestamp read fails there is nothing to compare, so the
//! snapshot stays `consistent` and the failure is listed in `gaps.failed`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Serialize, Serializer};

use super::types::{CardRecord, CaseRecord, CommentGroup, CommentScope, PlotSeries, Product};
use crate::data::cache::CacheError;
use crate::data::source::{CacheRead, DashboardSource};

/// A dataset that feeds a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPart {
    Cases(Product),
    Comments(CommentScope),
    Trending,
    PlotSeries,
    Timestamp,
}

impl fmt::Display for SnapshotPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cases(product) => write!(f, "cases:{product}"),
            Self::Comments(scope) => write!(f, "comments:{}", scope.as_str()),
            Self::Trending => f.write_str("trending"),
            Self::PlotSeries => f.write_str("plot_series"),
            Self::Timestamp => f.write_str("timestamp"),
        }
    }
}

impl Serialize for SnapshotPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parts that could not be read: absent keys versus failed reads
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotGaps {
    pub missing: Vec<SnapshotPart>,
    pub failed: Vec<SnapshotPart>,
}

impl SnapshotGaps {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    /// Resolve one read, recording a miss or failure and degrading to empty
    fn settle<T: Default>(
        &mut self,
        part: SnapshotPart,
        read: Result<CacheRead<T>, CacheError>,
    ) -> T {
        match read {
            Ok(CacheRead::Hit(value)) => value,
            Ok(CacheRead::Miss) => {
                self.missing.push(part);
                T::default()
            }
            Err(e) => {
                tracing::warn!(part = %part, error = %e, "Snapshot read failed, showing empty");
                self.failed.push(part);
                T::default()
            }
        }
    }

    /// Settle the refresh timestamps read around a fan-out into `as_of` and
    /// the consistency flag. Only two successful reads are compared.
    fn settle_refresh_window(
        &mut self,
        before: Result<CacheRead<String>, CacheError>,
        after: Result<CacheRead<String>, CacheError>,
    ) -> (Option<String>, bool) {
        let before = match before {
            Ok(read) => Some(read.into_option()),
            Err(e) => {
                tracing::warn!(error = %e, "Refresh timestamp read failed before snapshot");
                None
            }
        };
        let after_failed = after.is_err();
        let as_of: Option<String> =
            self.settle(SnapshotPart::Timestamp, after.map(|r| r.map(Some)));

        match before {
            Some(before) if !after_failed => {
                let consistent = before == as_of;
                if !consistent {
                    tracing::warn!(
                        before = ?before,
                        after = ?as_of,
                        "Cache refreshed while loading snapshot; data may mix refresh cycles"
                    );
                }
                (as_of, consistent)
            }
            Some(_) => (as_of, true),
            None => {
                if !after_failed {
                    self.failed.push(SnapshotPart::Timestamp);
                }
                (as_of, true)
            }
        }
    }
}

/// Recent and all-account comments for one product
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductComments {
    pub recent: Vec<CommentGroup>,
    pub all: Vec<CommentGroup>,
}

impl ProductComments {
    pub fn scope(&self, scope: CommentScope) -> &[CommentGroup] {
        match scope {
            CommentScope::Recent => &self.recent,
            CommentScope::All => &self.all,
        }
    }
}

/// Everything one dashboard page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// One entry per requested product, empty when uncached
    pub new_cases: BTreeMap<Product, Vec<CaseRecord>>,
    pub comments: BTreeMap<Product, ProductComments>,
    pub trending: Vec<CardRecord>,
    pub plot_series: Vec<PlotSeries>,
    pub as_of: Option<String>,
    pub gaps: SnapshotGaps,
    pub consistent: bool,
}

impl Snapshot {
    pub fn cases(&self, product: Product) -> &[CaseRecord] {
        self.new_cases.get(&product).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn comments(&self, product: Product, scope: CommentScope) -> &[CommentGroup] {
        self.comments
            .get(&product)
            .map(|c| c.scope(scope))
            .unwrap_or_default()
    }
}

/// Trending cards with the refresh window they were read in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingSnapshot {
    pub trending: Vec<CardRecord>,
    pub as_of: Option<String>,
    pub gaps: SnapshotGaps,
    pub consistent: bool,
}

/// Builds snapshots from a [`DashboardSource`]
#[derive(Clone)]
pub struct SnapshotLoader {
    source: Arc<dyn DashboardSource>,
}

impl SnapshotLoader {
    pub fn new(source: Arc<dyn DashboardSource>) -> Self {
        Self { source }
    }

    /// Load a snapshot covering `products`. Never writes to the cache.
    pub async fn load(&self, products: &[Product]) -> Snapshot {
        let source = self.source.as_ref();
        let before = source.last_refresh().await;

        let cases = join_all(
            products
                .iter()
                .map(|&product| async move { (product, source.cases(product).await) }),
        );
        let (cases, recent, all, trending, plot_series) = tokio::join!(
            cases,
            source.comments(CommentScope::Recent),
            source.comments(CommentScope::All),
            source.trending_cards(),
            source.plot_series(),
        );

        let after = source.last_refresh().await;

        let mut gaps = SnapshotGaps::default();
        let new_cases = cases
            .into_iter()
            .map(|(product, read)| (product, gaps.settle(SnapshotPart::Cases(product), read)))
            .collect();
        let mut recent = gaps.settle(SnapshotPart::Comments(CommentScope::Recent), recent);
        let mut all = gaps.settle(SnapshotPart::Comments(CommentScope::All), all);
        let comments = products
            .iter()
            .map(|&product| {
                let comments = ProductComments {
                    recent: recent.remove(product.as_str()).unwrap_or_default(),
                    all: all.remove(product.as_str()).unwrap_or_default(),
                };
                (product, comments)
            })
            .collect();
        let trending = gaps.settle(SnapshotPart::Trending, trending);
        let plot_series = gaps.settle(SnapshotPart::PlotSeries, plot_series);

        let (as_of, consistent) = gaps.settle_refresh_window(before, after);

        tracing::debug!(
            products = products.len(),
            missing = gaps.missing.len(),
            failed = gaps.failed.len(),
            "Snapshot loaded"
        );

        Snapshot {
            new_cases,
            comments,
            trending,
            plot_series,
            as_of,
            gaps,
            consistent,
        }
    }

    /// Load only the trending cards, so gaps never name unread datasets
    pub async fn load_trending(&self) -> TrendingSnapshot {
        let source = self.source.as_ref();
        let before = source.last_refresh().await;
        let trending = source.trending_cards().await;
        let after = source.last_refresh().await;

        let mut gaps = SnapshotGaps::default();
        let trending = gaps.settle(SnapshotPart::Trending, trending);
        let (as_of, consistent) = gaps.settle_refresh_window(before, after);

        tracing::debug!(
            cards = trending.len(),
            missing = gaps.missing.len(),
            failed = gaps.failed.len(),
            "Trending snapshot loaded"
        );

        TrendingSnapshot {
            trending,
            as_of,
            gaps,
            consistent,
        }
    }
}
