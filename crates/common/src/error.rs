//! Error types for HubTest

use thiserror::Error;

/// Result type alias using HubTest Error
pub type Result<T> = std::result::Result<T, Error>;

/// HubTest error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Database not configured: set TEST_DB_HOST and TEST_DB_NAME")]
    DatabaseNotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors that mean "the target row was missing or already in
    /// the desired state" rather than a connectivity problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
