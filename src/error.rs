//! Error types for the catalog console

use serde::Deserialize;
use thiserror::Error;

/// Failure categories reported by the controllers.
///
/// Search and lookup failures are absorbed (empty results, unlabelled
/// selection); list-load failures land in the list state; mutation failures
/// are returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Search,
    Lookup,
    ListLoad,
    Mutation,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Search => "search",
            FailureKind::Lookup => "lookup",
            FailureKind::ListLoad => "list_load",
            FailureKind::Mutation => "mutation",
        }
    }
}

/// One entry of a server-side validation payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    #[serde(default)]
    pub msg: String,
}

/// `detail` member of an error body: either plain text or a list of issues
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Issues(Vec<FieldIssue>),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rejected by server ({status})")]
    Rejected { status: u16, detail: ErrorDetail },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Controller disposed")]
    Disposed,
}

impl AppError {
    /// Human-readable text for the list `error` field and CLI output
    pub fn message(&self) -> String {
        match self {
            AppError::Rejected {
                detail: ErrorDetail::Message(msg),
                ..
            } => msg.clone(),
            AppError::Rejected {
                detail: ErrorDetail::Issues(issues),
                ..
            } => issues
                .iter()
                .map(|issue| issue.msg.as_str())
                .filter(|msg| !msg.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
            AppError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout
        } else if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
