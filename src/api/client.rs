use crate::api::{BounceBackend, CsvUpload, ReportLookup};
use crate::config::BackendConfig;
use crate::errors::{ApiError, ApiResult};
use crate::types::{CampaignId, Client, Report, TaskProgress, UploadResponse};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the bounce analytics backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_seconds: u64,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            ApiError::InvalidRequest(format!("Invalid backend URL '{}': {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "Backend URL '{}' cannot carry a path",
                config.url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        debug!("Backend client configured for {}", base_url);

        Ok(Self {
            http,
            base_url,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("Cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, endpoint: &Url, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                timeout_seconds: self.timeout_seconds,
                endpoint: endpoint.path().to_string(),
            }
        } else {
            ApiError::Transport {
                endpoint: endpoint.path().to_string(),
                message: err.to_string(),
            }
        }
    }

    async fn get(&self, url: &Url) -> ApiResult<Response> {
        debug!("GET {}", url);
        self.http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))
    }

    async fn decode<T: DeserializeOwned>(&self, url: &Url, response: Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserialisationFailed {
                endpoint: url.path().to_string(),
                message: e.to_string(),
            })
    }

    /// GET a JSON document, treating any non-2xx status as an error
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}", url.path(), status);
            return Err(ApiError::UnexpectedStatus {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }
        self.decode(&url, response).await
    }
}

#[async_trait]
impl BounceBackend for BackendClient {
    async fn list_campaigns(&self) -> ApiResult<Vec<Client>> {
        let url = self.endpoint(&["api", "campaigns"])?;
        self.get_json(url).await
    }

    async fn fetch_report(&self, campaign_id: &CampaignId) -> ApiResult<ReportLookup> {
        let url = self.endpoint(&["api", "report", campaign_id.as_str()])?;
        let response = self.get(&url).await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Report for {} not available yet", campaign_id);
                Ok(ReportLookup::NotFound)
            }
            status if status.is_success() => {
                Ok(ReportLookup::Found(self.decode(&url, response).await?))
            }
            status => Err(ApiError::UnexpectedStatus {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn campaign_exists(&self, campaign_id: &CampaignId) -> ApiResult<bool> {
        let url = self.endpoint(&["api", "campaigns", campaign_id.as_str(), "exists"])?;
        let response = self.get(&url).await?;
        Ok(response.status() == StatusCode::OK)
    }

    async fn upload_csv(&self, upload: CsvUpload) -> ApiResult<UploadResponse> {
        let url = self.endpoint(&["api", "upload", "csv"])?;
        let size = upload.bytes.len();

        let file_part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("text/csv")
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to create file part: {}", e)))?;
        let form = Form::new()
            .part("file", file_part)
            .text("client_name", upload.client_name)
            .text("campaign_name", upload.campaign_name);

        debug!("POST {} ({} bytes)", url, size);
        let response = self
            .http
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }
        self.decode(&url, response).await
    }

    async fn task_progress(&self, task_id: &str) -> ApiResult<TaskProgress> {
        let url = self.endpoint(&["api", "progress", task_id])?;
        self.get_json(url).await
    }

    async fn task_result(&self, task_id: &str) -> ApiResult<Report> {
        let url = self.endpoint(&["api", "analyze", task_id])?;
        self.get_json(url).await
    }
}
