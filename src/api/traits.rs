//! Backend seam
//!
//! Everything the dashboard needs from the bounce analytics backend goes
//! through [`BounceBackend`], so the polling and selection logic can run
//! against the HTTP client or an in-process fake.

use crate::errors::ApiResult;
use crate::types::{CampaignId, Client, Report, TaskProgress, UploadResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a report lookup where 404 is an expected answer
#[derive(Debug, Clone, PartialEq)]
pub enum ReportLookup {
    Found(Report),
    NotFound,
}

/// Multipart payload for `POST /api/upload/csv`
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub client_name: String,
    pub campaign_name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait BounceBackend: Send + Sync + 'static {
    /// `GET /api/campaigns`
    async fn list_campaigns(&self) -> ApiResult<Vec<Client>>;

    /// `GET /api/report/{campaign_id}`
    async fn fetch_report(&self, campaign_id: &CampaignId) -> ApiResult<ReportLookup>;

    /// `GET /api/campaigns/{campaign_id}/exists`
    async fn campaign_exists(&self, campaign_id: &CampaignId) -> ApiResult<bool>;

    /// `POST /api/upload/csv`
    async fn upload_csv(&self, upload: CsvUpload) -> ApiResult<UploadResponse>;

    /// `GET /api/progress/{task_id}`
    async fn task_progress(&self, task_id: &str) -> ApiResult<TaskProgress>;

    /// `GET /api/analyze/{task_id}`
    async fn task_result(&self, task_id: &str) -> ApiResult<Report>;
}

#[async_trait]
impl<T: BounceBackend + ?Sized> BounceBackend for Arc<T> {
    async fn list_campaigns(&self) -> ApiResult<Vec<Client>> {
        (**self).list_campaigns().await
    }

    async fn fetch_report(&self, campaign_id: &CampaignId) -> ApiResult<ReportLookup> {
        (**self).fetch_report(campaign_id).await
    }

    async fn campaign_exists(&self, campaign_id: &CampaignId) -> ApiResult<bool> {
        (**self).campaign_exists(campaign_id).await
    }

    async fn upload_csv(&self, upload: CsvUpload) -> ApiResult<UploadResponse> {
        (**self).upload_csv(upload).await
    }

    async fn task_progress(&self, task_id: &str) -> ApiResult<TaskProgress> {
        (**self).task_progress(task_id).await
    }

    async fn task_result(&self, task_id: &str) -> ApiResult<Report> {
        (**self).task_result(task_id).await
    }
}
