//! Bounce Dashboard - Type System
//!
//! - `report`: Report payload (global info, stats, breakdowns, pivot table)
//! - `campaign`: Client → campaign hierarchy and the campaign id key
//! - `progress`: Upload acknowledgement and ingestion task progress

mod campaign;
mod progress;
mod report;

pub use campaign::*;
pub use progress::*;
pub use report::*;
