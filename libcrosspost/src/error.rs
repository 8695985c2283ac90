//! Error types for Crosspost
//!
//! Errors fall into three categories, each with a distinct process exit
//! code at the CLI boundary: invalid input (3), upstream rejection (2),
//! and transport or local configuration failure (1).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrosspostError>;

#[derive(Error, Debug)]
pub enum CrosspostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl CrosspostError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CrosspostError::InvalidInput(_) => 3,
            CrosspostError::Upstream(_) => 2,
            CrosspostError::Transport(_) => 1,
            CrosspostError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Rejection from the upstream API: carries the HTTP status and the
/// upstream message verbatim, plus usage counters when the upstream
/// signals quota exhaustion.
#[derive(Error, Debug, Clone)]
#[error("HTTP {status}: {message}{}", quota_suffix(.usage.as_ref()))]
pub struct UpstreamError {
    pub status: u16,
    pub message: String,
    pub usage: Option<QuotaUsage>,
}

/// Usage counters reported alongside quota-exhaustion rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaUsage {
    pub used: u64,
    pub limit: u64,
}

fn quota_suffix(usage: Option<&QuotaUsage>) -> String {
    match usage {
        Some(u) => format!(" (used {} of {} posts this period)", u.used, u.limit),
        None => String::new(),
    }
}

/// Failure before any definitive upstream response was received
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),
}
