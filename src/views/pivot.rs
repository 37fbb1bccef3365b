//! Pivot table threshold view
//!
//! Every cell is measured against the grand total of the *whole* table. The
//! "only highlighted" filter narrows rows and columns and recomputes their
//! totals over what remains, but the grand total (and so every share) stays
//! anchored to the unfiltered data.

use crate::errors::{AppError, AppResult};
use crate::types::PivotTable;
use serde::Serialize;
use std::collections::BTreeSet;

pub const MIN_THRESHOLD: f64 = 5.0;
pub const MAX_THRESHOLD: f64 = 95.0;
pub const THRESHOLD_STEP: f64 = 5.0;

/// Highlight threshold as a percentage of the grand total, within 5..=95
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(percent: f64) -> AppResult<Self> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&percent) {
            return Err(AppError::InvalidInput(format!(
                "threshold must be within {}..={}, got {}",
                MIN_THRESHOLD, MAX_THRESHOLD, percent
            )));
        }
        Ok(Self(percent))
    }

    pub fn clamped(percent: f64) -> Self {
        if percent.is_nan() {
            return Self(MIN_THRESHOLD);
        }
        Self(percent.clamp(MIN_THRESHOLD, MAX_THRESHOLD))
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    /// One slider step up, saturating at the maximum
    pub fn step_up(self) -> Self {
        Self::clamped(self.0 + THRESHOLD_STEP)
    }

    pub fn step_down(self) -> Self {
        Self::clamped(self.0 - THRESHOLD_STEP)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(MIN_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotCell {
    pub source: String,
    pub value: u64,
    /// Percentage of the unfiltered grand total
    pub share: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub reason: String,
    pub cells: Vec<PivotCell>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotView {
    pub threshold: Threshold,
    pub only_highlighted: bool,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub column_totals: Vec<u64>,
    pub grand_total: u64,
}

/// Share of `value` in `grand_total`, as a percentage
pub fn share_of(value: u64, grand_total: u64) -> f64 {
    if grand_total == 0 {
        return 0.0;
    }
    value as f64 / grand_total as f64 * 100.0
}

/// A zero grand total highlights nothing
fn is_highlighted(value: u64, grand_total: u64, threshold: Threshold) -> bool {
    grand_total > 0 && share_of(value, grand_total) >= threshold.percent()
}

impl PivotView {
    pub fn build(table: &PivotTable, threshold: Threshold, only_highlighted: bool) -> Self {
        let grand_total: u64 = table.values().flat_map(|row| row.values()).sum();

        let all_sources: BTreeSet<&String> = table.values().flat_map(|row| row.keys()).collect();

        let kept_reasons: Vec<&String> = table
            .iter()
            .filter(|(_, row)| {
                !only_highlighted
                    || row
                        .values()
                        .any(|v| is_highlighted(*v, grand_total, threshold))
            })
            .map(|(reason, _)| reason)
            .collect();

        let columns: Vec<String> = all_sources
            .into_iter()
            .filter(|source| {
                !only_highlighted
                    || kept_reasons.iter().any(|reason| {
                        let value = table[*reason].get(*source).copied().unwrap_or(0);
                        is_highlighted(value, grand_total, threshold)
                    })
            })
            .cloned()
            .collect();

        let rows: Vec<PivotRow> = kept_reasons
            .iter()
            .map(|reason| {
                let source_counts = &table[*reason];
                let cells: Vec<PivotCell> = columns
                    .iter()
                    .map(|source| {
                        let value = source_counts.get(source).copied().unwrap_or(0);
                        PivotCell {
                            source: source.clone(),
                            value,
                            share: share_of(value, grand_total),
                            highlighted: is_highlighted(value, grand_total, threshold),
                        }
                    })
                    .collect();
                let total = cells.iter().map(|c| c.value).sum();
                PivotRow {
                    reason: (*reason).clone(),
                    cells,
                    total,
                }
            })
            .collect();

        let column_totals = (0..columns.len())
            .map(|i| rows.iter().map(|row| row.cells[i].value).sum())
            .collect();

        Self {
            threshold,
            only_highlighted,
            columns,
            rows,
            column_totals,
            grand_total,
        }
    }

    pub fn highlighted_cells(&self) -> impl Iterator<Item = (&str, &PivotCell)> {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .filter(|c| c.highlighted)
                .map(move |c| (row.reason.as_str(), c))
        })
    }

    pub fn cell(&self, reason: &str, source: &str) -> Option<&PivotCell> {
        self.rows
            .iter()
            .find(|r| r.reason == reason)?
            .cells
            .iter()
            .find(|c| c.source == source)
    }
}
