//! Bounce report payloads
//!
//! A [`Report`] is fetched whole and replaced whole; nothing in the crate
//! patches one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// reason → source → count
pub type PivotTable = BTreeMap<String, BTreeMap<String, u64>>;

/// Drill-down table keyed by top-level category
pub type Breakdown = BTreeMap<String, BreakdownEntry>;

/// Aggregated bounce analytics for one campaign
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub global_info: GlobalInfo,
    #[serde(default)]
    pub reason_stats: Stats,
    #[serde(default)]
    pub source_stats: Stats,
    #[serde(default)]
    pub pivot_table: PivotTable,
    #[serde(default)]
    pub reason_breakdown: Breakdown,
    #[serde(default)]
    pub source_breakdown: Breakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Report {
    pub fn total_bounces(&self) -> u64 {
        self.global_info.total_bounces
    }

    /// True while the backend has accepted the campaign but counted nothing yet
    pub fn is_empty(&self) -> bool {
        self.global_info.total_bounces == 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalInfo {
    pub total_bounces: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_record: Option<DateTime<Utc>>,
}

/// Counts and percentage shares per category label
///
/// `percentages` keys are expected to be a subset of `counts` keys and to sum
/// to roughly 100; neither is checked here.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub percentages: BTreeMap<String, f64>,
}

impl Stats {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Backend-supplied percentage, or the share of [`Stats::total`] when absent
    pub fn percentage_of(&self, name: &str) -> f64 {
        if let Some(pct) = self.percentages.get(name) {
            return *pct;
        }
        let total = self.total();
        match self.counts.get(name) {
            Some(count) if total > 0 => *count as f64 / total as f64 * 100.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}
