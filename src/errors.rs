use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Backend API operations
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV pre-validation of upload files
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied arguments that fail a precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A derived campaign id is already owned by a different client/campaign pair
    #[error(
        "Campaign id collision: {campaign_id} already belongs to client '{existing_client}' campaign '{existing_campaign}'"
    )]
    CampaignIdCollision {
        campaign_id: String,
        existing_client: String,
        existing_campaign: String,
    },

    /// Campaign id not present in the registry
    #[error("Unknown campaign: {0}")]
    UnknownCampaign(String),

    /// A spawned fetch or poll task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Backend API error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request never produced an HTTP response (DNS, connect, reset, ...)
    #[error("Transport failure calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Backend answered with a status the caller does not handle
    #[error("Unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// Failed to deserialise response body
    #[error("Deserialisation failed for {endpoint}: {message}")]
    DeserialisationFailed { endpoint: String, message: String },

    /// Request exceeded the configured client timeout
    #[error("Request timeout: {timeout_seconds}s for {endpoint}")]
    Timeout {
        timeout_seconds: u64,
        endpoint: String,
    },

    /// Polling budget exhausted before a terminal answer
    #[error("Max attempts exceeded: {operation} after {attempts} attempts")]
    MaxAttemptsExceeded { operation: String, attempts: u32 },

    /// Polling deadline elapsed before a terminal answer
    #[error("Deadline exceeded: {operation} after {elapsed_seconds}s")]
    DeadlineExceeded {
        operation: String,
        elapsed_seconds: u64,
    },

    /// Could not build a request (bad base URL, invalid multipart field)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for backend API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
