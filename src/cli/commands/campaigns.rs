use super::connect;
use crate::errors::AppResult;
use crate::views::{OutputFormat, ReportFormatter};
use clap::Args;
use tracing::info;

/// List clients and their campaigns
#[derive(Args)]
pub struct CampaignsCommand {
    /// Output format: console or json
    #[arg(long, default_value = "console")]
    pub format: String,
}

impl CampaignsCommand {
    pub async fn run(&self, backend_url: Option<&str>) -> AppResult<()> {
        let (_, dashboard) = connect(backend_url)?;
        let count = dashboard.bootstrap().await?;
        info!("Loaded {} campaigns", count);

        let snapshot = dashboard.snapshot();
        let output =
            ReportFormatter::format_clients(&snapshot.clients, &OutputFormat::parse(&self.format))?;
        println!("{}", output);
        Ok(())
    }
}
