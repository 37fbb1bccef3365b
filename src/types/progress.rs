//! Upload acknowledgement and ingestion progress payloads

use serde::{Deserialize, Serialize};

/// Response of `POST /api/upload/csv`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response of `GET /api/progress/{task_id}`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub processed_batches: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TaskProgress {
    /// Final results may only be requested once both flags agree
    pub fn is_finished(&self) -> bool {
        self.is_complete && self.progress >= 100
    }
}
