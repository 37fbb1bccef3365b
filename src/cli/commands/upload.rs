use super::connect;
use super::report::render;
use crate::dashboard::{PollOutcome, SelectOutcome, UploadRequest};
use crate::errors::{AppError, AppResult};
use crate::views::{OutputFormat, ReportFormatter, Threshold};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

/// Upload a bounce CSV and wait for the campaign to update
#[derive(Args)]
pub struct UploadCommand {
    /// Bounce CSV file
    pub file: PathBuf,

    /// Client the campaign belongs to
    #[arg(long)]
    pub client: String,

    /// Campaign name
    #[arg(long)]
    pub campaign: String,

    /// Output format for the final report: console or json
    #[arg(long, default_value = "console")]
    pub format: String,
}

impl UploadCommand {
    pub async fn run(&self, backend_url: Option<&str>) -> AppResult<()> {
        let (app_config, dashboard) = connect(backend_url)?;
        if let Err(e) = dashboard.bootstrap().await {
            warn!("Continuing without campaign list: {}", e);
        }

        let request = UploadRequest::from_path(&self.file, &self.client, &self.campaign)?;
        let ticket = dashboard.start_upload(request)?;
        println!("Uploading {} as {}", self.file.display(), ticket.campaign_id);

        let summary = ticket.wait().await;
        match &summary.submission {
            Ok(response) => {
                if let Some(task_id) = &response.task_id {
                    info!("Backend task {}", task_id);
                }
            }
            Err(e) => println!("Upload request failed: {}", e),
        }

        match summary.outcome {
            PollOutcome::Resolved { total, .. } => {
                println!(
                    "{} updated: {} bounces",
                    summary.campaign_id,
                    ReportFormatter::format_number(total)
                );
            }
            PollOutcome::Superseded => {
                println!("{} was updated by a newer read", summary.campaign_id);
            }
            PollOutcome::Cancelled => {
                println!("Polling for {} was cancelled", summary.campaign_id);
                return Ok(());
            }
            PollOutcome::Failed(e) => return Err(e.into()),
        }

        match dashboard.select_campaign(summary.campaign_id.clone()).await? {
            SelectOutcome::Displayed => {}
            SelectOutcome::Failed(e) => return Err(e.into()),
            _ => {
                return Err(AppError::UnknownCampaign(summary.campaign_id.to_string()));
            }
        }
        let report = dashboard
            .snapshot()
            .report
            .ok_or_else(|| AppError::UnknownCampaign(summary.campaign_id.to_string()))?;

        let output = render(
            &report,
            Threshold::clamped(app_config.view.default_threshold),
            false,
            None,
            None,
            &OutputFormat::parse(&self.format),
        )?;
        println!("{}", output);
        Ok(())
    }
}
