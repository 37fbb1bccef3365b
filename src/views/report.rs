//! Bounce report formatters
//!
//! Console output mirrors the dashboard layout: global info, the reason and
//! source charts with their drill-down panels, then the pivot table.

use super::chart::{
    series_from_stats, ChartPoint, ChartState, DrillDownPanel, REASON_CLICK_MESSAGE,
    REASON_NO_DATA_MESSAGE, SOURCE_CLICK_MESSAGE, SOURCE_NO_DATA_MESSAGE,
};
use super::pivot::PivotView;
use super::utils::{export_json, format_number};
use super::OutputFormat;
use crate::errors::AppResult;
use crate::types::{Client, Report};
use serde::Serialize;

/// Everything the dashboard displays for one report
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub title: Option<String>,
    pub total_bounces: u64,
    pub oldest_record: Option<String>,
    pub reasons: Vec<ChartPoint>,
    pub reason_panel: DrillDownPanel,
    pub sources: Vec<ChartPoint>,
    pub source_panel: DrillDownPanel,
    pub pivot: PivotView,
}

impl ReportView {
    pub fn build(
        report: &Report,
        reason_chart: &ChartState,
        source_chart: &ChartState,
        pivot: PivotView,
    ) -> Self {
        Self {
            title: report.title.clone(),
            total_bounces: report.total_bounces(),
            oldest_record: report.global_info.oldest_record.map(|t| t.to_rfc3339()),
            reasons: series_from_stats(&report.reason_stats),
            reason_panel: reason_chart.panel(
                &report.reason_breakdown,
                REASON_CLICK_MESSAGE,
                REASON_NO_DATA_MESSAGE,
            ),
            sources: series_from_stats(&report.source_stats),
            source_panel: source_chart.panel(
                &report.source_breakdown,
                SOURCE_CLICK_MESSAGE,
                SOURCE_NO_DATA_MESSAGE,
            ),
            pivot,
        }
    }
}

pub fn format_report(view: &ReportView, format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(view),
        OutputFormat::Console => {
            let mut output = String::new();

            output.push_str("=== BOUNCE REPORT ===\n");
            if let Some(title) = &view.title {
                output.push_str(&format!("Title:          {}\n", title));
            }
            output.push_str(&format!(
                "Total bounces:  {}\n",
                format_number(view.total_bounces)
            ));
            if let Some(oldest) = &view.oldest_record {
                output.push_str(&format!("Oldest record:  {}\n", oldest));
            }

            output.push_str("\n=== BOUNCE REASONS ===\n");
            push_series(&mut output, &view.reasons);
            push_panel(&mut output, &view.reason_panel, "Source breakdown");

            output.push_str("\n=== BOUNCE SOURCES ===\n");
            push_series(&mut output, &view.sources);
            push_panel(&mut output, &view.source_panel, "Reason breakdown");

            output.push_str(&format!(
                "\n=== PIVOT TABLE (threshold {}%{}) ===\n",
                view.pivot.threshold.percent(),
                if view.pivot.only_highlighted {
                    ", highlighted only"
                } else {
                    ""
                }
            ));
            push_pivot(&mut output, &view.pivot);

            Ok(output)
        }
    }
}

fn push_series(output: &mut String, series: &[ChartPoint]) {
    if series.is_empty() {
        output.push_str("(no data)\n");
        return;
    }
    output.push_str(&format!("{:<16} {:>10} {:>8}\n", "Name", "Count", "%"));
    output.push_str(&format!("{}\n", "-".repeat(36)));
    for point in series {
        output.push_str(&format!(
            "{:<16} {:>10} {:>7.1}%\n",
            point.label,
            format_number(point.value),
            point.percentage
        ));
    }
}

fn push_panel(output: &mut String, panel: &DrillDownPanel, heading: &str) {
    match panel {
        DrillDownPanel::Prompt { .. } => {}
        DrillDownPanel::NoData { category, message } => {
            output.push_str(&format!("\n{} for {}: {}\n", heading, category, message));
        }
        DrillDownPanel::Rows { category, rows } => {
            output.push_str(&format!("\n{} for {}:\n", heading, category));
            for (name, value) in rows {
                output.push_str(&format!("  {:<30} {:>10}\n", name, format_number(*value)));
            }
        }
    }
}

fn push_pivot(output: &mut String, pivot: &PivotView) {
    if pivot.rows.is_empty() {
        output.push_str("(no cells)\n");
        return;
    }

    output.push_str(&format!("{:<24}", ""));
    for column in &pivot.columns {
        output.push_str(&format!(" {:>12}", truncate(column, 12)));
    }
    output.push_str(&format!(" {:>12}\n", "Total"));

    for row in &pivot.rows {
        output.push_str(&format!("{:<24}", truncate(&row.reason, 24)));
        for cell in &row.cells {
            let marker = if cell.highlighted { "*" } else { " " };
            output.push_str(&format!(" {:>11}{}", format_number(cell.value), marker));
        }
        output.push_str(&format!(" {:>12}\n", format_number(row.total)));
    }

    output.push_str(&format!("{:<24}", "Total"));
    for total in &pivot.column_totals {
        output.push_str(&format!(" {:>12}", format_number(*total)));
    }
    output.push_str(&format!(" {:>12}\n", format_number(pivot.grand_total)));
    output.push_str("(* share of grand total at or above threshold)\n");
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width.saturating_sub(1)).chain(['…']).collect()
    }
}

/// Campaign listing grouped by client
pub fn format_clients(clients: &[Client], format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(&clients),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("=== CAMPAIGNS ===\n");
            if clients.is_empty() {
                output.push_str("(none)\n");
                return Ok(output);
            }
            for client in clients {
                output.push_str(&format!(
                    "\n{} ({} campaigns, {} bounces, updated {})\n",
                    client.client_name,
                    client.total_campaigns,
                    format_number(client.total_bounces),
                    client.last_updated.format("%Y-%m-%d"),
                ));
                for campaign in &client.campaigns {
                    let status = if campaign.is_loading {
                        match (campaign.progress, &campaign.progress_message) {
                            (Some(pct), Some(msg)) => format!(" [loading {}%: {}]", pct, msg),
                            _ => " [loading]".to_string(),
                        }
                    } else {
                        String::new()
                    };
                    output.push_str(&format!(
                        "  {:<40} {:>10}  {}{}\n",
                        campaign.campaign_id,
                        format_number(campaign.total),
                        campaign.last_updated.format("%Y-%m-%d"),
                        status
                    ));
                }
            }
            Ok(output)
        }
    }
}
