//! JSON view-models handed to the page renderer

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    CaseRecord, CommentGroup, Metric, PlotSeries, Product, SeverityRow, Snapshot, SnapshotGaps,
    StatsReport, StatsSummary,
};

/// Dashboard landing page
#[derive(Debug, Serialize)]
pub struct IndexView {
    pub new_cnv_cases: Vec<CaseRecord>,
    pub new_telco_cases: Vec<CaseRecord>,
    pub plot_series: Vec<PlotSeries>,
    pub as_of: Option<String>,
    pub gaps: SnapshotGaps,
    pub consistent: bool,
}

impl From<Snapshot> for IndexView {
    fn from(mut snapshot: Snapshot) -> Self {
        Self {
            new_cnv_cases: snapshot.new_cases.remove(&Product::Cnv).unwrap_or_default(),
            new_telco_cases: snapshot
                .new_cases
                .remove(&Product::Telco5g)
                .unwrap_or_default(),
            plot_series: snapshot.plot_series,
            as_of: snapshot.as_of,
            gaps: snapshot.gaps,
            consistent: snapshot.consistent,
        }
    }
}

/// Account-grouped card list
#[derive(Debug, Serialize)]
pub struct UpdatesView {
    pub as_of: Option<String>,
    pub comments: Vec<CommentGroup>,
    pub page_title: String,
    pub gaps: SnapshotGaps,
    pub consistent: bool,
}

/// Cards flattened and sorted by severity
#[derive(Debug, Serialize)]
pub struct TableView {
    pub as_of: Option<String>,
    pub rows: Vec<SeverityRow>,
    pub page_title: String,
    pub gaps: SnapshotGaps,
    pub consistent: bool,
}

/// Stats page: current summary plus charted history
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub as_of: String,
    pub stats: StatsSummary,
    pub x: Vec<String>,
    pub y: BTreeMap<Metric, Vec<u64>>,
    pub page_title: String,
    pub summary_missing: bool,
    pub history_missing: bool,
}

impl StatsView {
    pub fn new(report: StatsReport, as_of: String) -> Self {
        let page_title = report.page_title();
        Self {
            as_of,
            stats: report.summary,
            x: report.series.x,
            y: report.series.y,
            page_title,
            summary_missing: report.summary_missing,
            history_missing: report.history_missing,
        }
    }
}

/// The one user-facing error payload: exactly `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub error: String,
}
