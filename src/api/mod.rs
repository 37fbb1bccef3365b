//! Bounce analytics backend integration module
//!
//! - **Traits** - `BounceBackend` seam and its request/response helpers
//! - **Client** - Async reqwest client for the backend's REST endpoints
//! - **Retry** - Exponential backoff and poll budget utilities

pub mod client;
pub mod retry;
pub mod traits;

// Re-export main types
pub use client::BackendClient;
pub use retry::{calculate_next_backoff, Backoff, PollBudget};
pub use traits::{BounceBackend, CsvUpload, ReportLookup};
