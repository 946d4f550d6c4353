//! Dashboard records as the refresh job writes them
//!
//! Known fields are typed; anything else the job adds is carried through in
//! `extra` so the renderer still sees it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DashboardError;

/// Products tracked by the dashboard. The same set is the valid set of
/// stats case types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Telco5g,
    Cnv,
}

impl Product {
    pub const ALL: [Product; 2] = [Product::Telco5g, Product::Cnv];

    /// Route and stats slug
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telco5g => "telco5g",
            Self::Cnv => "cnv",
        }
    }

    /// Identifier the case accessor files this product's cases under
    pub fn case_source_id(self) -> &'static str {
        match self {
            Self::Telco5g => "shift_telco5g",
            Self::Cnv => "cnv",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telco5g" => Ok(Self::Telco5g),
            "cnv" => Ok(Self::Cnv),
            other => Err(DashboardError::UnknownCaseType(other.to_string())),
        }
    }
}

/// Which accounts a comments read covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentScope {
    /// Only accounts with cards updated in the last week
    Recent,
    All,
}

impl CommentScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::All => "all",
        }
    }
}

/// A support case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_number: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One comment on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardComment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// A tracked card: the working item for a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub comments: Vec<CardComment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An account and its recently commented cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub account: String,
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

impl CommentGroup {
    /// Group cards by account, accounts in order of first appearance
    pub fn group_cards(cards: Vec<CardRecord>) -> Vec<CommentGroup> {
        let mut groups: Vec<CommentGroup> = Vec::new();
        for card in cards {
            match groups.iter_mut().find(|g| g.account == card.account) {
                Some(group) => group.cards.push(card),
                None => groups.push(CommentGroup {
                    account: card.account.clone(),
                    cards: vec![card],
                }),
            }
        }
        groups
    }
}

/// Comment groups per product slug, as stored under one comments key
pub type CommentsByProduct = BTreeMap<String, Vec<CommentGroup>>;

/// A named series for the summary chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// The stats generator's current summary for a case type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsSummary(pub Map<String, Value>);
