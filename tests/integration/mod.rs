//! Integration Tests Module
//!
//! End-to-end tests that drive the dashboard through the HTTP client against
//! a mock backend, and render the resulting reports.

pub mod report_rendering;
