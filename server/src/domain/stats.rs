//! Historical statistics reshaping
//!
//! The stats generator stores one record per day under `<case_type>_stats`.
//! Charts want the transpose: one x axis of days and one aligned y series
//! per metric.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DashboardError;
use super::types::{Product, StatsSummary};
use crate::data::source::{CacheRead, DashboardSource};

/// Charted metrics, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Escalated,
    OpenCases,
    NewCases,
    ClosedCases,
    NoUpdates,
    NoBzs,
    BugsUnique,
    BugsNoTgt,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Escalated,
        Metric::OpenCases,
        Metric::NewCases,
        Metric::ClosedCases,
        Metric::NoUpdates,
        Metric::NoBzs,
        Metric::BugsUnique,
        Metric::BugsNoTgt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Escalated => "escalated",
            Self::OpenCases => "open_cases",
            Self::NewCases => "new_cases",
            Self::ClosedCases => "closed_cases",
            Self::NoUpdates => "no_updates",
            Self::NoBzs => "no_bzs",
            Self::BugsUnique => "bugs_unique",
            Self::BugsNoTgt => "bugs_no_tgt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BugCounts {
    pub unique: u64,
    pub no_target: u64,
}

/// One day of stats. Every field is required; extra fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoricalStatsRecord {
    pub escalated: u64,
    pub open_cases: u64,
    pub daily_opened_cases: u64,
    pub daily_closed_cases: u64,
    pub no_updates: u64,
    pub no_bzs: u64,
    pub bugs: BugCounts,
}

impl HistoricalStatsRecord {
    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Escalated => self.escalated,
            Metric::OpenCases => self.open_cases,
            Metric::NewCases => self.daily_opened_cases,
            Metric::ClosedCases => self.daily_closed_cases,
            Metric::NoUpdates => self.no_updates,
            Metric::NoBzs => self.no_bzs,
            Metric::BugsUnique => self.bugs.unique,
            Metric::BugsNoTgt => self.bugs.no_target,
        }
    }
}

/// Days on `x`, one index-aligned series per metric on `y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReshapedSeries {
    pub x: Vec<String>,
    pub y: BTreeMap<Metric, Vec<u64>>,
}

impl Default for ReshapedSeries {
    fn default() -> Self {
        Self {
            x: Vec::new(),
            y: Metric::ALL.into_iter().map(|m| (m, Vec::new())).collect(),
        }
    }
}

impl ReshapedSeries {
    /// Transpose a day-keyed history, keeping the store's key order.
    ///
    /// Out-of-order days are logged and kept as stored.
    pub fn from_history(history: &Map<String, Value>) -> Result<Self, DashboardError> {
        let mut series = Self {
            x: Vec::with_capacity(history.len()),
            y: Metric::ALL
                .into_iter()
                .map(|m| (m, Vec::with_capacity(history.len())))
                .collect(),
        };

        let mut out_of_order = false;
        for (day, raw) in history {
            let record = HistoricalStatsRecord::deserialize(raw).map_err(|e| {
                DashboardError::UpstreamDataShape {
                    day: day.clone(),
                    reason: e.to_string(),
                }
            })?;
            if series.x.last().is_some_and(|prev| prev > day) {
                out_of_order = true;
            }
            series.x.push(day.clone());
            for (metric, values) in series.y.iter_mut() {
                values.push(record.metric(*metric));
            }
        }

        if out_of_order {
            tracing::warn!(
                days = series.x.len(),
                "Stats history days are not in chronological order; charting as stored"
            );
        }
        Ok(series)
    }

    pub fn is_aligned(&self) -> bool {
        self.y.len() == Metric::ALL.len() && self.y.values().all(|v| v.len() == self.x.len())
    }

    pub fn get(&self, metric: Metric) -> &[u64] {
        self.y.get(&metric).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Current summary plus charted history for one case type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub case_type: Product,
    pub summary: StatsSummary,
    pub series: ReshapedSeries,
    pub summary_missing: bool,
    pub history_missing: bool,
}

impl StatsReport {
    pub fn page_title(&self) -> String {
        format!("stats/{}", self.case_type)
    }
}

/// Produces [`StatsReport`]s from a [`DashboardSource`]
#[derive(Clone)]
pub struct StatsReshaper {
    source: Arc<dyn DashboardSource>,
}

impl StatsReshaper {
    pub fn new(source: Arc<dyn DashboardSource>) -> Self {
        Self { source }
    }

    pub async fn reshape(&self, case_type: &str) -> Result<StatsReport, DashboardError> {
        let case_type: Product = case_type.parse()?;

        let (summary, history) = tokio::join!(
            self.source.generate_stats(case_type),
            self.source.stats_history(case_type),
        );

        let (summary, summary_missing) = match summary? {
            CacheRead::Hit(summary) => (summary, false),
            CacheRead::Miss => (StatsSummary::default(), true),
        };
        let (series, history_missing) = match history? {
            CacheRead::Hit(Value::Object(days)) => (ReshapedSeries::from_history(&days)?, false),
            CacheRead::Hit(Value::Null) | CacheRead::Miss => (ReshapedSeries::default(), true),
            CacheRead::Hit(_) => return Err(DashboardError::MalformedHistory(case_type)),
        };

        tracing::debug!(
            case_type = %case_type,
            days = series.x.len(),
            summary_missing,
            history_missing,
            "Stats reshaped"
        );

        Ok(StatsReport {
            case_type,
            summary,
            series,
            summary_missing,
            history_missing,
        })
    }
}
