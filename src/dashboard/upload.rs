//! Upload-and-poll workflow

use super::poller::{self, PollOutcome};
use super::state::PendingPoll;
use super::Dashboard;
use crate::api::{BounceBackend, CsvUpload};
use crate::errors::{ApiResult, AppError, AppResult};
use crate::types::{CampaignId, UploadResponse};
use chrono::Utc;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// A bounce CSV plus the names it is filed under
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub client_name: String,
    pub campaign_name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(
        client_name: impl Into<String>,
        campaign_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            campaign_name: campaign_name.into(),
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a CSV from disk, checking it has a header and at least one record
    pub fn from_path(path: &Path, client_name: &str, campaign_name: &str) -> AppResult<Self> {
        let bytes = fs::read(path)?;
        let rows = count_csv_records(&bytes)?;
        info!("{} contains {} bounce records", path.display(), rows);

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("bounces.csv")
            .to_string();
        Ok(Self::new(client_name, campaign_name, file_name, bytes))
    }

    /// Enforce preconditions and normalise names
    fn validated(self) -> AppResult<Self> {
        let client_name = self.client_name.trim().to_string();
        let campaign_name = self.campaign_name.trim().to_string();
        if client_name.is_empty() {
            return Err(AppError::InvalidInput("client name is blank".to_string()));
        }
        if campaign_name.is_empty() {
            return Err(AppError::InvalidInput("campaign name is blank".to_string()));
        }
        if self.bytes.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "upload file '{}' is empty",
                self.file_name
            )));
        }
        Ok(Self {
            client_name,
            campaign_name,
            ..self
        })
    }
}

/// Count data records after the header row
pub fn count_csv_records(bytes: &[u8]) -> AppResult<u64> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    if reader.headers()?.is_empty() {
        return Err(AppError::InvalidInput("CSV has no header row".to_string()));
    }

    let mut count = 0u64;
    for record in reader.records() {
        record?;
        count += 1;
    }
    if count == 0 {
        return Err(AppError::InvalidInput(
            "CSV has a header but no records".to_string(),
        ));
    }
    Ok(count)
}

/// Handles to the two background tasks of one upload
///
/// Dropping the ticket leaves both tasks running.
#[derive(Debug)]
pub struct UploadTicket {
    pub campaign_id: CampaignId,
    pub submission: JoinHandle<ApiResult<UploadResponse>>,
    pub poll: JoinHandle<PollOutcome>,
}

/// Both results of an upload once its poll has settled
#[derive(Debug)]
pub struct UploadSummary {
    pub campaign_id: CampaignId,
    pub submission: ApiResult<UploadResponse>,
    pub outcome: PollOutcome,
}

fn settled_poll(result: Result<PollOutcome, JoinError>) -> PollOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => PollOutcome::Cancelled,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

impl UploadTicket {
    /// Wait for the poll to settle, then for the submission
    pub async fn wait(self) -> UploadSummary {
        let outcome = settled_poll(self.poll.await);
        let submission = match self.submission.await {
            Ok(result) => result,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };
        UploadSummary {
            campaign_id: self.campaign_id,
            submission,
            outcome,
        }
    }

    pub async fn wait_for_poll(self) -> PollOutcome {
        settled_poll(self.poll.await)
    }
}

impl<B: BounceBackend> Dashboard<B> {
    /// Start an upload without waiting for it
    ///
    /// Registers the campaign optimistically, submits the file on one task and
    /// polls for completion on another. The two race; neither waits for the
    /// other. Must be called from within a Tokio runtime.
    pub fn start_upload(&self, request: UploadRequest) -> AppResult<UploadTicket> {
        let request = request.validated()?;

        let mut state = self.lock();
        let generation = state.issue_ticket();
        let campaign_id = state.registry.begin_upload(
            &request.client_name,
            &request.campaign_name,
            generation,
            Utc::now(),
        )?;
        if state.cancel_poll(&campaign_id) {
            debug!("Replaced earlier poll for {}", campaign_id);
        }

        let upload = CsvUpload {
            client_name: request.client_name,
            campaign_name: request.campaign_name,
            file_name: request.file_name,
            bytes: request.bytes,
        };
        let submission = tokio::spawn(self.clone().submit(campaign_id.clone(), upload));
        let poll = tokio::spawn(poller::poll_until_settled(
            self.clone(),
            campaign_id.clone(),
            generation,
        ));
        state.pending.insert(
            campaign_id.clone(),
            PendingPoll {
                generation,
                handle: poll.abort_handle(),
            },
        );
        drop(state);

        info!("Upload started for {}", campaign_id);
        Ok(UploadTicket {
            campaign_id,
            submission,
            poll,
        })
    }

    async fn submit(self, campaign_id: CampaignId, upload: CsvUpload) -> ApiResult<UploadResponse> {
        let size = upload.bytes.len();
        match self.backend().upload_csv(upload).await {
            Ok(response) => {
                info!("Submitted {} bytes for {}", size, campaign_id);
                if let Some(task_id) = response.task_id.clone() {
                    self.lock().registry.set_task(&campaign_id, &task_id);
                    if self.polling().track_progress {
                        let dashboard = self.clone();
                        let tracked = campaign_id.clone();
                        tokio::spawn(async move {
                            // Failures are logged and written onto the campaign
                            let _ = dashboard.track_task(&task_id, Some(tracked)).await;
                        });
                    }
                }
                Ok(response)
            }
            Err(e) => {
                warn!("Upload failed for {}: {}", campaign_id, e);
                self.lock().last_error = Some(format!("Upload failed for {}: {}", campaign_id, e));
                Err(e)
            }
        }
    }
}
