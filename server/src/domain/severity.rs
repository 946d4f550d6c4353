//! Severity ordering for the table views

use serde::Serialize;

use super::types::{CardRecord, CommentGroup};

/// Case severity, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Urgent,
    High,
    Normal,
    Low,
}

impl Severity {
    /// Parse the upstream `"1 (Urgent)"` form, a bare level or a bare name
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let level = raw.split_whitespace().next().unwrap_or_default();
        let by_level = match level {
            "1" => Some(Self::Urgent),
            "2" => Some(Self::High),
            "3" => Some(Self::Normal),
            "4" => Some(Self::Low),
            _ => None,
        };
        by_level.or_else(|| {
            let name = raw.trim_start_matches('(').trim_end_matches(')');
            match name.to_ascii_lowercase().as_str() {
                "urgent" => Some(Self::Urgent),
                "high" => Some(Self::High),
                "normal" | "medium" => Some(Self::Normal),
                "low" => Some(Self::Low),
                _ => None,
            }
        })
    }

    /// Sort rank; unknown severities rank after every known one
    pub fn rank(severity: Option<Self>) -> u8 {
        match severity {
            Some(Self::Urgent) => 1,
            Some(Self::High) => 2,
            Some(Self::Normal) => 3,
            Some(Self::Low) => 4,
            None => 5,
        }
    }
}

/// One row of a severity table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityRow {
    pub account: String,
    pub severity: Option<Severity>,
    pub severity_rank: u8,
    pub card: CardRecord,
}

/// Flatten comment groups into rows sorted by severity.
///
/// The sort is stable, so cards of equal severity keep their account order.
pub fn severity_table(groups: &[CommentGroup]) -> Vec<SeverityRow> {
    let mut rows: Vec<SeverityRow> = groups
        .iter()
        .flat_map(|group| {
            group.cards.iter().map(|card| {
                let severity = card.severity.as_deref().and_then(Severity::parse);
                SeverityRow {
                    account: group.account.clone(),
                    severity,
                    severity_rank: Severity::rank(severity),
                    card: card.clone(),
                }
            })
        })
        .collect();
    rows.sort_by_key(|row| row.severity_rank);
    rows
}
