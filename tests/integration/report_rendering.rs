//! Pivot and chart views over a realistic report

use crate::common::{report_with_total, sample_report};
use anyhow::Result;
use bounce_dashboard::views::chart::{series_from_stats, SOURCE_NO_DATA_MESSAGE};
use bounce_dashboard::views::{
    ChartKind, ChartState, DrillDownPanel, OutputFormat, PivotView, ReportFormatter, ReportView,
    Threshold,
};

#[test]
fn test_pivot_highlights_against_unfiltered_total() -> Result<()> {
    let report = sample_report();
    let view = PivotView::build(&report.pivot_table, Threshold::new(25.0)?, false);

    assert_eq!(view.grand_total, 200);
    assert_eq!(view.columns, vec!["Gmail", "Yahoo"]);
    let highlighted: Vec<(&str, &str)> = view
        .highlighted_cells()
        .map(|(reason, cell)| (reason, cell.source.as_str()))
        .collect();
    assert_eq!(
        highlighted,
        vec![("Hard bounce", "Gmail"), ("Soft bounce", "Yahoo")]
    );
    Ok(())
}

#[test]
fn test_only_highlighted_recomputes_totals_over_kept_cells() -> Result<()> {
    let report = sample_report();
    let view = PivotView::build(&report.pivot_table, Threshold::new(50.0)?, true);

    // Only Hard bounce / Gmail reaches 50% of 200
    assert_eq!(view.columns, vec!["Gmail"]);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].reason, "Hard bounce");
    assert_eq!(view.rows[0].total, 100);
    assert_eq!(view.column_totals, vec![100]);
    assert_eq!(view.grand_total, 200);
    assert!((view.rows[0].cells[0].share - 50.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_threshold_slider_saturates() {
    let mut threshold = Threshold::default();
    assert_eq!(threshold.step_down().percent(), 5.0);
    for _ in 0..30 {
        threshold = threshold.step_up();
    }
    assert_eq!(threshold.percent(), 95.0);
    assert!(Threshold::new(100.0).is_err());
}

#[test]
fn test_empty_report_highlights_nothing() {
    let report = report_with_total(0);
    let view = PivotView::build(&report.pivot_table, Threshold::default(), true);
    assert!(view.rows.is_empty());
    assert_eq!(view.grand_total, 0);
}

#[test]
fn test_chart_series_and_drill_down() {
    let report = sample_report();

    let sources = series_from_stats(&report.source_stats);
    assert_eq!(sources[0].name, "Gmail");
    assert_eq!(sources[0].value, 106);
    assert_eq!(sources[1].name, "Yahoo");

    let mut chart = ChartState::default();
    chart.set_kind(ChartKind::Pie);
    chart.select("Outlook");
    let panel = chart.panel(&report.source_breakdown, "click", SOURCE_NO_DATA_MESSAGE);
    assert_eq!(
        panel,
        DrillDownPanel::NoData {
            category: "Outlook".to_string(),
            message: SOURCE_NO_DATA_MESSAGE.to_string(),
        }
    );

    chart.select("Yahoo");
    let DrillDownPanel::Rows { rows, .. } =
        chart.panel(&report.source_breakdown, "click", SOURCE_NO_DATA_MESSAGE)
    else {
        panic!("expected rows for Yahoo");
    };
    assert_eq!(
        rows,
        vec![
            ("Soft bounce".to_string(), 54),
            ("Hard bounce".to_string(), 40)
        ]
    );
}

#[test]
fn test_json_and_console_output() -> Result<()> {
    let report = sample_report();
    let view = ReportView::build(
        &report,
        &ChartState::default(),
        &ChartState::default(),
        PivotView::build(&report.pivot_table, Threshold::new(45.0)?, false),
    );

    let console = ReportFormatter::format_report(&view, &OutputFormat::Console)?;
    assert!(console.contains("Title:          Spring 2024"));
    assert!(console.contains("=== PIVOT TABLE (threshold 45%) ==="));
    assert!(console.contains("100*"));

    let json = ReportFormatter::format_report(&view, &OutputFormat::parse("JSON"))?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["total_bounces"], 200);
    assert_eq!(value["reason_panel"]["state"], "prompt");
    assert_eq!(value["pivot"]["grand_total"], 200);
    Ok(())
}
