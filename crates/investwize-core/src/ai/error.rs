//! Completion error types

use reqwest::StatusCode;
use thiserror::Error;

/// Why a completion request produced no usable text
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key not configured (set {0})")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion response contained no text")]
    EmptyCompletion,
}

/// Coarse classification used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential absent
    Configuration,
    /// Request could not be sent, or timed out
    Transport,
    /// Non-success status, or a body without usable text
    Upstream,
}

impl CompletionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingCredential(_) => FailureKind::Configuration,
            Self::Transport(_) => FailureKind::Transport,
            Self::Status { .. } | Self::Malformed(_) | Self::EmptyCompletion => {
                FailureKind::Upstream
            }
        }
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Upstream => "upstream",
        }
    }
}
