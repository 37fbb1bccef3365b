//! Dashboard state synchronisation
//!
//! [`Dashboard`] owns the registry, the displayed report slot and the map of
//! pending polls behind one mutex, and exposes the user actions that mutate
//! them:
//!
//! - **bootstrap** - load the backend's campaign list into the registry
//! - **start_upload** - optimistic registry entry, background submission and
//!   completion poll (see [`poller`])
//! - **select_campaign** - cancel that campaign's poll and fetch its report
//! - **track_task** - follow an ingestion task's progress to its final report
//!
//! The mutex is never held across an await; every backend read is issued a
//! ticket before it starts and its write is dropped if a newer read already
//! landed.

pub mod poller;
pub mod progress;
pub mod state;
pub mod upload;

pub use poller::PollOutcome;
pub use progress::{TaskResult, TASK_ERROR_MESSAGE};
pub use state::DashboardSnapshot;
pub use upload::{UploadRequest, UploadSummary, UploadTicket};

use crate::api::{BounceBackend, ReportLookup};
use crate::config::PollingConfig;
use crate::errors::{ApiError, AppResult};
use crate::registry::WriteOutcome;
use crate::types::{Campaign, CampaignId, Report};
use chrono::Utc;
use state::DashboardState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Shared<B> {
    backend: B,
    polling: PollingConfig,
    state: Mutex<DashboardState>,
}

/// Result of a direct report fetch for the selected campaign
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Report fetched and shown
    Displayed,
    /// Report fetched but a newer selection or read owns the display
    Superseded,
    NotFound,
    Failed(ApiError),
}

/// Cloneable handle to the shared dashboard state
pub struct Dashboard<B> {
    shared: Arc<Shared<B>>,
}

impl<B> Clone for Dashboard<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: BounceBackend> Dashboard<B> {
    pub fn new(backend: B, polling: PollingConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                polling,
                state: Mutex::new(DashboardState::default()),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.shared.polling
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().snapshot()
    }

    pub fn campaign(&self, campaign_id: &CampaignId) -> Option<Campaign> {
        self.lock().registry.campaign(campaign_id).cloned()
    }

    pub fn has_pending_poll(&self, campaign_id: &CampaignId) -> bool {
        self.lock().has_pending_poll(campaign_id)
    }

    /// Load the backend's campaign list and merge it into the registry
    ///
    /// The list is ticketed like any other read, so campaigns written by a
    /// poll or fetch that started after this request keep their figures.
    pub async fn bootstrap(&self) -> AppResult<usize> {
        let ticket = self.lock().issue_ticket();
        let clients = self.shared.backend.list_campaigns().await.map_err(|e| {
            warn!("Failed to load campaigns from backend: {}", e);
            e
        })?;

        let mut state = self.lock();
        state.registry.merge_server(clients, ticket);
        let count = state.registry.campaign_count();
        info!(
            "Registry loaded: {} clients, {} campaigns",
            state.registry.clients().len(),
            count
        );
        Ok(count)
    }

    pub async fn campaign_exists(&self, campaign_id: &CampaignId) -> AppResult<bool> {
        Ok(self.shared.backend.campaign_exists(campaign_id).await?)
    }

    /// Select a campaign for display and fetch its report in the background
    ///
    /// Cancels the pending poll of this campaign only; polls for other
    /// campaigns keep running.
    pub fn select_campaign(&self, campaign_id: CampaignId) -> JoinHandle<SelectOutcome> {
        let ticket = {
            let mut state = self.lock();
            if state.cancel_poll(&campaign_id) {
                debug!("Cancelled pending poll for {}", campaign_id);
            }
            let ticket = state.issue_ticket();
            state.display.select(campaign_id.clone(), ticket);
            state.registry.mark_loading(&campaign_id, ticket);
            state.last_error = None;
            ticket
        };

        let dashboard = self.clone();
        tokio::spawn(async move { dashboard.fetch_selected(campaign_id, ticket).await })
    }

    async fn fetch_selected(&self, campaign_id: CampaignId, ticket: u64) -> SelectOutcome {
        let result = self.shared.backend.fetch_report(&campaign_id).await;

        let mut state = self.lock();
        match result {
            Ok(ReportLookup::Found(report)) => {
                let total = report.total_bounces();
                state
                    .registry
                    .apply_report(&campaign_id, ticket, total, Utc::now());
                if state.display.offer(&campaign_id, ticket, report) {
                    info!("Displaying {} ({} bounces)", campaign_id, total);
                    SelectOutcome::Displayed
                } else {
                    debug!("Fetched {} but display moved on", campaign_id);
                    SelectOutcome::Superseded
                }
            }
            Ok(ReportLookup::NotFound) => {
                state.registry.mark_failed(&campaign_id, ticket);
                state.display.fetch_failed(&campaign_id, ticket);
                state.last_error = Some(format!("No report found for {}", campaign_id));
                warn!("No report found for {}", campaign_id);
                SelectOutcome::NotFound
            }
            Err(e) => {
                state.registry.mark_failed(&campaign_id, ticket);
                state.display.fetch_failed(&campaign_id, ticket);
                state.last_error = Some(e.to_string());
                warn!("Failed to load report for {}: {}", campaign_id, e);
                SelectOutcome::Failed(e)
            }
        }
    }

    /// Terminal transition: the poll saw a strictly larger bounce count
    pub(crate) fn resolve_poll(
        &self,
        campaign_id: &CampaignId,
        generation: u64,
        ticket: u64,
        report: Report,
    ) -> PollOutcome {
        let total = report.total_bounces();
        let mut state = self.lock();
        state.release_poll(campaign_id, generation);

        match state
            .registry
            .apply_report(campaign_id, ticket, total, Utc::now())
        {
            WriteOutcome::Stale => {
                debug!("Poll result for {} superseded by a newer read", campaign_id);
                PollOutcome::Superseded
            }
            _ => {
                let displayed = state.display.offer(campaign_id, ticket, report);
                info!(
                    "Campaign {} resolved with {} bounces{}",
                    campaign_id,
                    total,
                    if displayed { " (displayed)" } else { "" }
                );
                PollOutcome::Resolved { total, displayed }
            }
        }
    }

    /// Terminal transition: unexpected status, transport error or exhausted budget
    pub(crate) fn fail_poll(
        &self,
        campaign_id: &CampaignId,
        generation: u64,
        ticket: u64,
        error: ApiError,
    ) -> PollOutcome {
        let mut state = self.lock();
        state.release_poll(campaign_id, generation);
        state.registry.mark_failed(campaign_id, ticket);
        state.last_error = Some(error.to_string());
        warn!("Polling for {} failed: {}", campaign_id, error);
        PollOutcome::Failed(error)
    }
}
