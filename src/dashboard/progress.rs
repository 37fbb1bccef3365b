//! Ingestion task progress tracking

use super::Dashboard;
use crate::api::{Backoff, BounceBackend, PollBudget};
use crate::errors::AppResult;
use crate::types::{CampaignId, Report, TaskProgress};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Progress message left on a campaign whose tracking failed
pub const TASK_ERROR_MESSAGE: &str = "Error occurred";

/// How a tracked task ended
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Completed(Report),
    /// The campaign stopped loading before the task finished
    Abandoned,
}

impl<B: BounceBackend> Dashboard<B> {
    /// Follow an ingestion task until it finishes, then fetch its report
    ///
    /// With a `campaign_id`, progress is written onto that campaign and
    /// tracking stops once the campaign is no longer loading. Only progress
    /// fields are written; totals and the loading flag belong to the poller.
    /// When tracking fails, a loading campaign's message becomes
    /// [`TASK_ERROR_MESSAGE`].
    pub async fn track_task(
        &self,
        task_id: &str,
        campaign_id: Option<CampaignId>,
    ) -> AppResult<TaskResult> {
        let result = self.follow_task(task_id, campaign_id.as_ref()).await;
        if let Err(e) = &result {
            warn!("Progress tracking for task {} failed: {}", task_id, e);
            if let Some(id) = &campaign_id {
                let mut state = self.lock();
                if state.registry.campaign(id).is_some_and(|c| c.is_loading) {
                    state.registry.set_progress_message(id, TASK_ERROR_MESSAGE);
                }
            }
        }
        result
    }

    async fn follow_task(
        &self,
        task_id: &str,
        campaign_id: Option<&CampaignId>,
    ) -> AppResult<TaskResult> {
        let mut budget = PollBudget::new(format!("progress({})", task_id), self.polling());
        let mut interval = Backoff::fixed(self.polling().progress_interval());

        loop {
            budget.record_attempt();
            let progress = self.backend().task_progress(task_id).await?;

            if let Some(id) = campaign_id {
                if !self.record_progress(id, &progress) {
                    debug!("Stopped tracking task {}: {} settled", task_id, id);
                    return Ok(TaskResult::Abandoned);
                }
            }

            if progress.is_finished() {
                let report = self.backend().task_result(task_id).await?;
                info!(
                    "Task {} finished with {} bounces",
                    task_id,
                    report.total_bounces()
                );
                return Ok(TaskResult::Completed(report));
            }

            debug!(
                "Task {} at {}%: {}",
                task_id, progress.progress, progress.message
            );
            let delay = interval.next_delay();
            budget.ensure_can_wait(delay)?;
            sleep(delay).await;
        }
    }

    /// Write progress onto a loading campaign, false when it is not loading
    fn record_progress(&self, campaign_id: &CampaignId, progress: &TaskProgress) -> bool {
        let mut state = self.lock();
        let loading = state
            .registry
            .campaign(campaign_id)
            .is_some_and(|c| c.is_loading);
        if loading {
            state
                .registry
                .set_progress(campaign_id, progress.progress, &progress.message);
        }
        loading
    }
}
