//! Presentation data and output generation
//!
//! Pure computations over a fetched [`Report`](crate::types::Report): chart
//! series and drill-down panels, the pivot threshold view, and console/JSON
//! formatting via the [`ReportFormatter`] facade.

pub mod chart;
pub mod pivot;
pub mod report;
pub mod utils;

pub use chart::{ChartKind, ChartPoint, ChartState, DrillDownPanel};
pub use pivot::{PivotView, Threshold};
pub use report::ReportView;

use crate::errors::AppResult;
use crate::types::Client;

/// Output format options for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl OutputFormat {
    pub fn parse(format_str: &str) -> Self {
        match format_str.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Console,
        }
    }
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_number(n: u64) -> String {
        utils::format_number(n)
    }

    pub fn format_report(view: &ReportView, f: &OutputFormat) -> AppResult<String> {
        report::format_report(view, f)
    }

    pub fn format_clients(clients: &[Client], f: &OutputFormat) -> AppResult<String> {
        report::format_clients(clients, f)
    }
}
