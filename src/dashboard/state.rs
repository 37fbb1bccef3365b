use crate::registry::Registry;
use crate::types::{Campaign, CampaignId, Client, Report};
use std::collections::HashMap;
use tokio::task::AbortHandle;

/// The single "currently displayed report" slot
///
/// Writes follow the same ticket rule as the registry: only the campaign that
/// is selected may fill the slot, and only with a read issued no earlier than
/// the selection itself.
#[derive(Debug, Default, Clone)]
pub struct DisplaySlot {
    selected: Option<CampaignId>,
    report: Option<Report>,
    revision: u64,
    loading: bool,
}

impl DisplaySlot {
    pub fn selected(&self) -> Option<&CampaignId> {
        self.selected.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn select(&mut self, campaign_id: CampaignId, ticket: u64) {
        self.selected = Some(campaign_id);
        self.report = None;
        self.loading = true;
        self.revision = ticket;
    }

    /// Replace the displayed report if `campaign_id` is selected and the read is fresh
    pub(crate) fn offer(&mut self, campaign_id: &CampaignId, ticket: u64, report: Report) -> bool {
        if self.selected.as_ref() != Some(campaign_id) || ticket < self.revision {
            return false;
        }
        self.report = Some(report);
        self.revision = ticket;
        self.loading = false;
        true
    }

    pub(crate) fn fetch_failed(&mut self, campaign_id: &CampaignId, ticket: u64) {
        if self.selected.as_ref() == Some(campaign_id) && ticket >= self.revision {
            self.revision = ticket;
            self.loading = false;
        }
    }
}

#[derive(Debug)]
pub(crate) struct PendingPoll {
    pub generation: u64,
    pub handle: AbortHandle,
}

/// All mutable dashboard state, owned by one mutex
#[derive(Debug, Default)]
pub struct DashboardState {
    pub(crate) registry: Registry,
    pub(crate) display: DisplaySlot,
    pub(crate) pending: HashMap<CampaignId, PendingPoll>,
    pub(crate) last_error: Option<String>,
    next_ticket: u64,
}

impl DashboardState {
    /// Tickets are strictly increasing for the lifetime of the state
    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub fn has_pending_poll(&self, campaign_id: &CampaignId) -> bool {
        self.pending.contains_key(campaign_id)
    }

    /// Abort and forget the poll for one campaign
    pub(crate) fn cancel_poll(&mut self, campaign_id: &CampaignId) -> bool {
        match self.pending.remove(campaign_id) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forget a finished poll, unless a newer poll has replaced it
    pub(crate) fn release_poll(&mut self, campaign_id: &CampaignId, generation: u64) {
        if self
            .pending
            .get(campaign_id)
            .is_some_and(|p| p.generation == generation)
        {
            self.pending.remove(campaign_id);
        }
    }

    pub(crate) fn snapshot(&self) -> DashboardSnapshot {
        let mut pending: Vec<CampaignId> = self.pending.keys().cloned().collect();
        pending.sort();
        DashboardSnapshot {
            clients: self.registry.clients().to_vec(),
            selected: self.display.selected().cloned(),
            report: self.display.report().cloned(),
            fetching: self.display.is_loading(),
            last_error: self.last_error.clone(),
            pending_polls: pending,
        }
    }
}

/// Point-in-time copy of the dashboard for rendering
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub clients: Vec<Client>,
    pub selected: Option<CampaignId>,
    pub report: Option<Report>,
    pub fetching: bool,
    pub last_error: Option<String>,
    pub pending_polls: Vec<CampaignId>,
}

impl DashboardSnapshot {
    pub fn campaign(&self, campaign_id: &CampaignId) -> Option<&Campaign> {
        self.clients.iter().find_map(|c| c.campaign(campaign_id))
    }

    pub fn client(&self, client_name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.client_name == client_name)
    }
}
