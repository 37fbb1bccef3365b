//! Completion polling for an uploaded campaign
//!
//! ```text
//! POLLING --404--------------------------> POLLING (not-found delay)
//! POLLING --200, total == 0--------------> POLLING (processing delay)
//! POLLING --200, total <= recorded-------> POLLING (processing delay)
//! POLLING --200, total > recorded--------> RESOLVED
//! POLLING --other status / transport-----> FAILED
//! POLLING --attempts or deadline spent---> FAILED
//! ```
//!
//! The recorded total is read from the registry at the start of every tick.

use super::Dashboard;
use crate::api::{Backoff, BounceBackend, PollBudget, ReportLookup};
use crate::errors::ApiError;
use crate::types::CampaignId;
use tokio::time::sleep;
use tracing::debug;

/// Terminal state of one campaign poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Resolved { total: u64, displayed: bool },
    /// Resolved, but a read issued later had already updated the campaign
    Superseded,
    Failed(ApiError),
    /// Aborted by selecting the campaign or by a newer upload of it
    Cancelled,
}

impl PollOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, PollOutcome::Resolved { .. })
    }
}

pub(crate) async fn poll_until_settled<B: BounceBackend>(
    dashboard: Dashboard<B>,
    campaign_id: CampaignId,
    generation: u64,
) -> PollOutcome {
    let polling = dashboard.polling().clone();
    let mut budget = PollBudget::new(format!("poll({})", campaign_id), &polling);
    let mut not_found = Backoff::new(
        polling.not_found_delay(),
        polling.backoff_multiplier,
        polling.max_backoff(),
    );
    let mut processing = Backoff::new(
        polling.processing_delay(),
        polling.backoff_multiplier,
        polling.max_backoff(),
    );

    loop {
        budget.record_attempt();
        let (ticket, recorded_total) = {
            let mut state = dashboard.lock();
            let ticket = state.issue_ticket();
            let recorded = state
                .registry
                .campaign(&campaign_id)
                .map(|c| c.total)
                .unwrap_or(0);
            (ticket, recorded)
        };

        let delay = match dashboard.backend().fetch_report(&campaign_id).await {
            Ok(ReportLookup::NotFound) => {
                let delay = not_found.next_delay();
                debug!(
                    "{} not visible yet (attempt {}), retrying in {:?}",
                    campaign_id,
                    budget.attempts(),
                    delay
                );
                delay
            }
            Ok(ReportLookup::Found(report)) if report.is_empty() => {
                let delay = processing.next_delay();
                debug!("{} still processing, retrying in {:?}", campaign_id, delay);
                delay
            }
            Ok(ReportLookup::Found(report)) if report.total_bounces() <= recorded_total => {
                let delay = processing.next_delay();
                debug!(
                    "{} not updated yet ({} <= {}), retrying in {:?}",
                    campaign_id,
                    report.total_bounces(),
                    recorded_total,
                    delay
                );
                delay
            }
            Ok(ReportLookup::Found(report)) => {
                return dashboard.resolve_poll(&campaign_id, generation, ticket, report);
            }
            Err(e) => {
                return dashboard.fail_poll(&campaign_id, generation, ticket, e);
            }
        };

        if let Err(e) = budget.ensure_can_wait(delay) {
            return dashboard.fail_poll(&campaign_id, generation, ticket, e);
        }
        sleep(delay).await;
    }
}
