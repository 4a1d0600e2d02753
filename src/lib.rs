//! Parsing and aggregation of semicolon-delimited plan upgrade exports.
//!
//! [`loader::parse`] turns the raw export into records sorted by value and
//! [`reports::aggregate`] derives the dashboard statistics from them. Both are
//! pure functions of their input; the rest of the crate renders and exports
//! their output.
pub mod args;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{AppError, Result};
pub use loader::{parse, parse_with_report, ParseReport};
pub use reports::aggregate;
pub use types::{DashboardStatistics, UpgradeRecord};
