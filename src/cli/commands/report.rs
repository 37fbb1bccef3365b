use super::connect;
use crate::dashboard::SelectOutcome;
use crate::errors::{AppError, AppResult};
use crate::types::{CampaignId, Report};
use crate::views::{ChartState, OutputFormat, PivotView, ReportFormatter, ReportView, Threshold};
use clap::Args;
use tracing::{info, warn};

/// Show the bounce report for one campaign
#[derive(Args)]
pub struct ReportCommand {
    /// Campaign id (`<client>-<campaign>`)
    pub campaign_id: String,

    /// Pivot highlight threshold in percent (5-95)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Hide pivot rows and columns without a highlighted cell
    #[arg(long)]
    pub only_highlighted: bool,

    /// Drill into a bounce reason
    #[arg(long)]
    pub reason: Option<String>,

    /// Drill into a bounce source
    #[arg(long)]
    pub source: Option<String>,

    /// Output format: console or json
    #[arg(long, default_value = "console")]
    pub format: String,
}

impl ReportCommand {
    pub async fn run(&self, backend_url: Option<&str>) -> AppResult<()> {
        let (app_config, dashboard) = connect(backend_url)?;
        let threshold =
            Threshold::new(self.threshold.unwrap_or(app_config.view.default_threshold))?;

        // The registry is only needed for totals in the log line
        if let Err(e) = dashboard.bootstrap().await {
            warn!("Continuing without campaign list: {}", e);
        }

        let campaign_id = CampaignId::from(self.campaign_id.as_str());
        match dashboard.select_campaign(campaign_id.clone()).await? {
            SelectOutcome::Displayed => {}
            SelectOutcome::NotFound => {
                return Err(AppError::UnknownCampaign(campaign_id.to_string()))
            }
            SelectOutcome::Failed(e) => return Err(e.into()),
            SelectOutcome::Superseded => {
                return Err(AppError::InvalidData(format!(
                    "report for {} was superseded",
                    campaign_id
                )))
            }
        }

        let snapshot = dashboard.snapshot();
        let report = snapshot.report.ok_or_else(|| {
            AppError::InvalidData(format!("no report displayed for {}", campaign_id))
        })?;
        if let Some(campaign) = snapshot.clients.iter().find_map(|c| c.campaign(&campaign_id)) {
            info!("{} last updated {}", campaign_id, campaign.last_updated);
        }

        let output = render(
            &report,
            threshold,
            self.only_highlighted,
            self.reason.as_deref(),
            self.source.as_deref(),
            &OutputFormat::parse(&self.format),
        )?;
        println!("{}", output);
        Ok(())
    }
}

/// Build the full dashboard view of a report and format it
pub(crate) fn render(
    report: &Report,
    threshold: Threshold,
    only_highlighted: bool,
    reason: Option<&str>,
    source: Option<&str>,
    format: &OutputFormat,
) -> AppResult<String> {
    let mut reason_chart = ChartState::default();
    if let Some(reason) = reason {
        reason_chart.select(reason);
    }
    let mut source_chart = ChartState::default();
    if let Some(source) = source {
        source_chart.select(source);
    }

    let pivot = PivotView::build(&report.pivot_table, threshold, only_highlighted);
    let view = ReportView::build(report, &reason_chart, &source_chart, pivot);
    ReportFormatter::format_report(&view, format)
}
