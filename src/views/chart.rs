//! Chart series and drill-down panel data
//!
//! Drawing is left to whatever front end consumes these values; this module
//! only decides what is shown and in which order.

use crate::types::{Breakdown, Stats};
use serde::Serialize;
use std::cmp::Ordering;

pub const REASON_CLICK_MESSAGE: &str = "Click on a bounce reason to see its source breakdown";
pub const REASON_NO_DATA_MESSAGE: &str = "No source breakdown available for this reason";
pub const SOURCE_CLICK_MESSAGE: &str = "Click on a bounce source to see its reason breakdown";
pub const SOURCE_NO_DATA_MESSAGE: &str = "No reason breakdown available for this source";

const LABEL_MAX_CHARS: usize = 15;
const LABEL_KEEP_CHARS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    /// Axis label, shortened with [`format_label`]
    pub label: String,
    pub value: u64,
    pub percentage: f64,
}

/// Descending by value, ties broken by name so output is stable
fn by_value_desc(a: &(String, u64), b: &(String, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Top-level series for a stats block, largest category first
pub fn series_from_stats(stats: &Stats) -> Vec<ChartPoint> {
    let mut entries: Vec<(String, u64)> = stats
        .counts
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    entries.sort_by(by_value_desc);

    entries
        .into_iter()
        .map(|(name, value)| ChartPoint {
            percentage: stats.percentage_of(&name),
            label: format_label(&name),
            name,
            value,
        })
        .collect()
}

/// Shorten long axis labels to 12 characters plus an ellipsis
pub fn format_label(text: &str) -> String {
    if text.chars().count() > LABEL_MAX_CHARS {
        let kept: String = text.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// What the side panel shows for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DrillDownPanel {
    /// Nothing selected yet
    Prompt { message: String },
    /// Selected category has no breakdown entry
    NoData { category: String, message: String },
    Rows {
        category: String,
        rows: Vec<(String, u64)>,
    },
}

/// Resolve the drill-down panel for `selected` against a breakdown table
pub fn drill_down(
    breakdown: &Breakdown,
    selected: Option<&str>,
    click_message: &str,
    no_data_message: &str,
) -> DrillDownPanel {
    let Some(category) = selected else {
        return DrillDownPanel::Prompt {
            message: click_message.to_string(),
        };
    };

    match breakdown.get(category) {
        Some(entry) => {
            let mut rows: Vec<(String, u64)> = entry
                .counts
                .iter()
                .map(|(name, value)| (name.clone(), *value))
                .collect();
            rows.sort_by(by_value_desc);
            DrillDownPanel::Rows {
                category: category.to_string(),
                rows,
            }
        }
        None => DrillDownPanel::NoData {
            category: category.to_string(),
            message: no_data_message.to_string(),
        },
    }
}

/// UI state of one chart: its kind toggle and the active category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    pub kind: ChartKind,
    pub selected: Option<String>,
}

impl ChartState {
    pub fn set_kind(&mut self, kind: ChartKind) {
        self.kind = kind;
    }

    pub fn select(&mut self, category: &str) {
        self.selected = Some(category.to_string());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn panel(&self, breakdown: &Breakdown, click: &str, no_data: &str) -> DrillDownPanel {
        drill_down(breakdown, self.selected.as_deref(), click, no_data)
    }
}
