//! Unit Tests Module
//!
//! Component tests against the HTTP client and the in-process scripted backend.

pub mod progress;
