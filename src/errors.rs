//! Typed error hierarchy for the Handoff dispatcher.
//!
//! Three top-level enums cover the three subsystems:
//! - `ConfigError` — environment resolution failures
//! - `TrackerError` — issue-tracker API failures
//! - `ChatError` — chat-service API failures

use thiserror::Error;

/// Errors from configuration resolution. Always fatal, and always raised
/// before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors from the issue-tracker client.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tracker API error: {0}")]
    Api(String),

    #[error("Tracker response missing {0}")]
    MissingData(&'static str),
}

/// Errors from the chat-service client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat API error: {0}")]
    Api(String),

    #[error("Chat response missing {0}")]
    MissingData(&'static str),
}
