use std::path::PathBuf;

use crate::model::FetchStatus;

/// Terminal outcome of a single fetch attempt.
///
/// None of these end the process; the scheduler keeps the previous snapshot
/// and tries again on the next interval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("no network connectivity")]
    NoConnectivity,

    #[error("server responded with HTTP status {0}")]
    HttpStatus(u16),

    #[error("failed to decode response: {0}")]
    DecodeFailed(String),

    #[error("request failed before a response arrived: {0}")]
    Transport(String),
}

impl FetchError {
    /// Status signal published to the rendering layer for this failure.
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchError::NoConnectivity => FetchStatus::NoConnectivity,
            FetchError::HttpStatus(_) | FetchError::Transport(_) => FetchStatus::HttpError,
            FetchError::DecodeFailed(_) => FetchStatus::DecodeError,
        }
    }
}

/// A single override line that could not be applied. The line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigParseIssue {
    #[error("line {line}: expected `key=value`")]
    MissingSeparator { line: usize },

    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },
}

/// Non-fatal notices collected while resolving the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("override source unavailable ({reason}), using compiled defaults")]
    SourceUnavailable { path: Option<PathBuf>, reason: String },

    #[error(transparent)]
    Parse(#[from] ConfigParseIssue),
}
