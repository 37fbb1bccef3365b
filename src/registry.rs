//! Client → campaign view model
//!
//! Mirrors the backend's campaign list, holds optimistic entries for uploads
//! the backend has not confirmed yet, and applies updates from polls and
//! direct fetches.
//!
//! Every write that originates from a backend read carries the ticket issued
//! when that read started. A write is applied only when its ticket is not
//! older than the campaign's `revision`, so a slow response can never
//! overwrite the result of a read that started after it.

use crate::errors::{AppError, AppResult};
use crate::types::{Campaign, CampaignId, Client};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Result of a ticketed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// A newer read already wrote this campaign
    Stale,
    Unknown,
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    clients: Vec<Client>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clients(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn client(&self, client_name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.client_name == client_name)
    }

    pub fn campaign(&self, campaign_id: &CampaignId) -> Option<&Campaign> {
        self.clients.iter().find_map(|c| c.campaign(campaign_id))
    }

    fn locate_mut(&mut self, campaign_id: &CampaignId) -> Option<(&mut Client, usize)> {
        self.clients.iter_mut().find_map(|client| {
            client
                .campaigns
                .iter()
                .position(|c| &c.campaign_id == campaign_id)
                .map(|idx| (client, idx))
        })
    }

    pub fn campaign_count(&self) -> usize {
        self.clients.iter().map(|c| c.campaigns.len()).sum()
    }

    /// Optimistically register an upload
    ///
    /// An existing campaign is flagged as loading; otherwise a campaign (and
    /// its client, when new) is created with `total = 0`. Fails when the
    /// derived id already belongs to another client/campaign pair.
    pub fn begin_upload(
        &mut self,
        client_name: &str,
        campaign_name: &str,
        ticket: u64,
        now: DateTime<Utc>,
    ) -> AppResult<CampaignId> {
        let campaign_id = CampaignId::derive(client_name, campaign_name);

        if let Some((client, idx)) = self.locate_mut(&campaign_id) {
            let campaign = &mut client.campaigns[idx];
            if client.client_name != client_name || campaign.campaign_name != campaign_name {
                return Err(AppError::CampaignIdCollision {
                    campaign_id: campaign_id.to_string(),
                    existing_client: client.client_name.clone(),
                    existing_campaign: campaign.campaign_name.clone(),
                });
            }
            campaign.is_loading = true;
            campaign.progress = None;
            campaign.progress_message = None;
            campaign.revision = campaign.revision.max(ticket);
            debug!("Re-upload for existing campaign {}", campaign_id);
            return Ok(campaign_id);
        }

        let mut campaign = Campaign::pending(campaign_id.clone(), campaign_name, now);
        campaign.revision = ticket;

        match self
            .clients
            .iter_mut()
            .find(|c| c.client_name == client_name)
        {
            Some(client) => {
                client.campaigns.push(campaign);
                client.refresh_totals();
                debug!("Appended campaign {} to client {}", campaign_id, client_name);
            }
            None => {
                let mut client = Client::new(client_name, now);
                client.campaigns.push(campaign);
                client.refresh_totals();
                self.clients.push(client);
                debug!("Created client {} for campaign {}", client_name, campaign_id);
            }
        }

        Ok(campaign_id)
    }

    /// Flag a campaign as loading on behalf of the read holding `ticket`
    pub fn mark_loading(&mut self, campaign_id: &CampaignId, ticket: u64) -> WriteOutcome {
        self.write(campaign_id, ticket, |campaign| campaign.is_loading = true)
    }

    /// Record a fetched report's totals and clear the loading flag
    pub fn apply_report(
        &mut self,
        campaign_id: &CampaignId,
        ticket: u64,
        total: u64,
        now: DateTime<Utc>,
    ) -> WriteOutcome {
        self.write(campaign_id, ticket, |campaign| {
            campaign.total = total;
            campaign.last_updated = now;
            campaign.is_loading = false;
        })
    }

    /// Clear the loading flag after a failed read
    pub fn mark_failed(&mut self, campaign_id: &CampaignId, ticket: u64) -> WriteOutcome {
        self.write(campaign_id, ticket, |campaign| campaign.is_loading = false)
    }

    fn write(
        &mut self,
        campaign_id: &CampaignId,
        ticket: u64,
        update: impl FnOnce(&mut Campaign),
    ) -> WriteOutcome {
        let Some((client, idx)) = self.locate_mut(campaign_id) else {
            return WriteOutcome::Unknown;
        };
        let campaign = &mut client.campaigns[idx];
        if ticket < campaign.revision {
            debug!(
                "Dropping stale write to {} (ticket {} < revision {})",
                campaign_id, ticket, campaign.revision
            );
            return WriteOutcome::Stale;
        }
        campaign.revision = ticket;
        update(campaign);
        client.refresh_totals();
        WriteOutcome::Applied
    }

    pub fn set_task(&mut self, campaign_id: &CampaignId, task_id: &str) -> bool {
        match self.locate_mut(campaign_id) {
            Some((client, idx)) => {
                client.campaigns[idx].task_id = Some(task_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_progress(&mut self, campaign_id: &CampaignId, progress: u8, message: &str) -> bool {
        match self.locate_mut(campaign_id) {
            Some((client, idx)) => {
                let campaign = &mut client.campaigns[idx];
                campaign.progress = Some(progress.min(100));
                campaign.progress_message = Some(message.to_string());
                true
            }
            None => false,
        }
    }

    /// Replace the progress message, leaving the percentage as it was
    pub fn set_progress_message(&mut self, campaign_id: &CampaignId, message: &str) -> bool {
        match self.locate_mut(campaign_id) {
            Some((client, idx)) => {
                client.campaigns[idx].progress_message = Some(message.to_string());
                true
            }
            None => false,
        }
    }

    /// Merge the backend's campaign list into the registry
    ///
    /// `ticket` is the one issued when the list request started. Server fields
    /// win unless a read issued after that ticket has already written the
    /// campaign. Campaigns still loading keep their local flags, progress and
    /// revision, and local entries the server does not know yet are kept
    /// after the server's entries.
    pub fn merge_server(&mut self, server: Vec<Client>, ticket: u64) {
        let mut local = std::mem::take(&mut self.clients);
        let mut merged = Vec::with_capacity(server.len() + local.len());

        for mut server_client in server {
            if let Some(pos) = local
                .iter()
                .position(|c| c.client_name == server_client.client_name)
            {
                let mut local_client = local.remove(pos);
                let mut kept_local = false;

                for server_campaign in server_client.campaigns.iter_mut() {
                    if let Some(idx) = local_client
                        .campaigns
                        .iter()
                        .position(|c| c.campaign_id == server_campaign.campaign_id)
                    {
                        let local_campaign = local_client.campaigns.remove(idx);
                        kept_local |= carry_local_state(server_campaign, local_campaign, ticket);
                    }
                }
                for leftover in local_client.campaigns {
                    server_client.campaigns.push(leftover);
                    kept_local = true;
                }
                if kept_local {
                    server_client.refresh_totals();
                }
            }
            merged.push(server_client);
        }

        merged.extend(local);
        debug!(
            "Registry merged: {} clients, {} campaigns",
            merged.len(),
            merged.iter().map(|c| c.campaigns.len()).sum::<usize>()
        );
        self.clients = merged;
    }
}

/// Returns true when local figures replaced the server's
fn carry_local_state(server: &mut Campaign, local: Campaign, ticket: u64) -> bool {
    server.task_id = local.task_id;

    let newer = local.revision > ticket;
    if newer {
        debug!(
            "Keeping {} from a newer read (revision {} > list ticket {})",
            server.campaign_id, local.revision, ticket
        );
        server.total = local.total;
        server.last_updated = local.last_updated;
        server.is_loading = local.is_loading;
    }

    if local.is_loading {
        server.is_loading = true;
        server.progress = local.progress;
        server.progress_message = local.progress_message;
        server.revision = local.revision;
    } else {
        server.revision = local.revision.max(ticket);
    }
    newer || local.is_loading
}
