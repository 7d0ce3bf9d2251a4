//! Error types for the suite core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Feed mock failed to start: {0}")]
    ServerStartup(String),

    #[error("Feed mock health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("No value extracted for key: {0}")]
    MissingValue(String),

    #[error("Test skipped: {0}")]
    Skipped(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] hubtest_common::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
