//! Common types and errors for the Kakuyomu MCP server
//!
//! This crate provides the error type and constants shared by every other crate.

pub mod telemetry;

use thiserror::Error;

/// Core error types for Kakuyomu operations
#[derive(Error, Debug)]
pub enum KakuError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("__NEXT_DATA__ script tag not found")]
    MissingNextData,

    #[error("Apollo state not found in __NEXT_DATA__ (props.pageProps.__APOLLO_STATE__)")]
    MissingApolloState,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Rate limit exceeded: {current}/{limit} in {window}s")]
    RateLimit {
        current: usize,
        limit: usize,
        window: u64,
        retry_after: u64,
    },

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, KakuError>;

/// Process exit codes
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 101;
