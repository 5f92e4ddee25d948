//! Error types for the Mastermind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error::kind`] folds them
//! into the three failure classes the rest of the system reasons about.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Mastermind operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Card database errors ---
    #[error("Card data error: {0}")]
    CardData(#[from] CardDataError),

    // --- Rules corpus errors ---
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A grounding source or the completion provider could not be reached.
    SourceUnavailable,
    /// A card lookup missed.
    NotFound,
    /// The completion provider failed after streaming began.
    StreamFailure,
    /// Anything else (configuration, serialization, bugs).
    Other,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider(e) => e.kind(),
            Self::CardData(CardDataError::NotFound(_)) => ErrorKind::NotFound,
            Self::CardData(_) | Self::Corpus(_) => ErrorKind::SourceUnavailable,
            Self::Config { .. } | Self::Serialization(_) | Self::Internal(_) => ErrorKind::Other,
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StreamInterrupted(_) => ErrorKind::StreamFailure,
            Self::NotConfigured(_) => ErrorKind::Other,
            _ => ErrorKind::SourceUnavailable,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CardDataError {
    #[error("Card not found: {0}")]
    NotFound(String),

    #[error("Card database unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected card database response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read rules corpus at {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}
