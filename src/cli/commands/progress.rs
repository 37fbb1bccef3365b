use super::connect;
use super::report::render;
use crate::dashboard::TaskResult;
use crate::errors::AppResult;
use crate::views::{OutputFormat, Threshold};
use clap::Args;

/// Follow an ingestion task until it completes
#[derive(Args)]
pub struct ProgressCommand {
    /// Task id returned by the upload endpoint
    pub task_id: String,

    /// Output format: console or json
    #[arg(long, default_value = "console")]
    pub format: String,
}

impl ProgressCommand {
    pub async fn run(&self, backend_url: Option<&str>) -> AppResult<()> {
        let (app_config, dashboard) = connect(backend_url)?;

        match dashboard.track_task(&self.task_id, None).await? {
            TaskResult::Completed(report) => {
                let threshold = Threshold::clamped(app_config.view.default_threshold);
                let output = render(
                    &report,
                    threshold,
                    false,
                    None,
                    None,
                    &OutputFormat::parse(&self.format),
                )?;
                println!("{}", output);
            }
            TaskResult::Abandoned => println!("Task {} was abandoned", self.task_id),
        }
        Ok(())
    }
}
