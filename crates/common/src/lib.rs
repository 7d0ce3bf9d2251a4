//! HubTest Common Library
//!
//! Shared configuration, error types, and database helpers for the HUB
//! E2E test suite.

pub mod config;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use config::TestConfig;
pub use db::{FeedStore, PgFeedStore};
pub use error::{Error, Result};

/// HubTest version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory for durable test artifacts (bug reports, HTML report)
pub fn default_reports_dir() -> std::path::PathBuf {
    std::path::PathBuf::from("reports")
}

/// Well-known file name of the last-failure bug report inside the reports dir
pub const BUG_REPORT_FILE: &str = "last_failure_bug_report.txt";
