use super::connect;
use crate::errors::AppResult;
use crate::types::CampaignId;
use clap::Args;

/// Check whether the backend has a report for a campaign
#[derive(Args)]
pub struct ExistsCommand {
    /// Campaign id (`<client>-<campaign>`)
    pub campaign_id: String,
}

impl ExistsCommand {
    pub async fn run(&self, backend_url: Option<&str>) -> AppResult<()> {
        let (_, dashboard) = connect(backend_url)?;
        let campaign_id = CampaignId::from(self.campaign_id.as_str());

        if dashboard.campaign_exists(&campaign_id).await? {
            println!("{} exists", campaign_id);
        } else {
            println!("{} not found", campaign_id);
        }
        Ok(())
    }
}
