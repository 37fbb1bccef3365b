//! Client → campaign hierarchy mirrored from the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between client and campaign names in a campaign id
pub const CAMPAIGN_ID_SEPARATOR: char = '-';

/// Backend key of a campaign, `<client>-<campaign>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    /// The one place a campaign id is derived from names
    pub fn derive(client_name: &str, campaign_name: &str) -> Self {
        Self(format!(
            "{}{}{}",
            client_name, CAMPAIGN_ID_SEPARATOR, campaign_name
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CampaignId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A named batch of bounce records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "isLoading", default)]
    pub is_loading: bool,

    /// Ingestion task reported by the upload endpoint
    #[serde(skip)]
    pub task_id: Option<String>,
    #[serde(skip)]
    pub progress: Option<u8>,
    #[serde(skip)]
    pub progress_message: Option<String>,
    /// Ticket of the last backend read applied to this campaign
    #[serde(skip)]
    pub revision: u64,
}

impl Campaign {
    /// Placeholder created before the backend has seen the upload
    pub fn pending(campaign_id: CampaignId, campaign_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            campaign_id,
            campaign_name: campaign_name.to_string(),
            last_updated: now,
            total: 0,
            is_loading: true,
            task_id: None,
            progress: None,
            progress_message: None,
            revision: 0,
        }
    }
}

/// Grouping entity owning campaigns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_name: String,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub total_campaigns: u64,
    #[serde(default)]
    pub total_bounces: u64,
    pub last_updated: DateTime<Utc>,
}

impl Client {
    pub fn new(client_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            client_name: client_name.to_string(),
            campaigns: Vec::new(),
            total_campaigns: 0,
            total_bounces: 0,
            last_updated: now,
        }
    }

    pub fn campaign(&self, campaign_id: &CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| &c.campaign_id == campaign_id)
    }

    /// Recompute aggregates after a local mutation
    pub fn refresh_totals(&mut self) {
        self.total_campaigns = self.campaigns.len() as u64;
        self.total_bounces = self.campaigns.iter().map(|c| c.total).sum();
        if let Some(latest) = self.campaigns.iter().map(|c| c.last_updated).max() {
            self.last_updated = self.last_updated.max(latest);
        }
    }
}
