//! Bounce Dashboard
//!
//! Client side of an email-bounce analytics service: a typed backend client,
//! the client/campaign registry, the upload-and-poll workflow, and the pivot
//! and chart views computed from a fetched report.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod registry;
pub mod types;
pub mod views;
