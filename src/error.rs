//! Error types for the economic data agent

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Malformed indicator selection: {0}")]
    MalformedSelection(String),

    #[error("Unknown series: {0}")]
    UnknownSeries(String),

    #[error("No observations for series {0} in the requested window")]
    EmptySeries(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    // =============================
    // Startup Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Malformed provider payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse tag for an [`AgentError`], carried by failed outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedSelection,
    UnknownSeries,
    EmptySeries,
    ProviderUnavailable,
    Config,
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::MalformedSelection(_) => ErrorKind::MalformedSelection,
            AgentError::UnknownSeries(_) => ErrorKind::UnknownSeries,
            AgentError::EmptySeries(_) => ErrorKind::EmptySeries,
            AgentError::Config(_) => ErrorKind::Config,
            // A payload that fails to decode or a transport failure both mean
            // the provider did not give us a usable answer.
            AgentError::ProviderUnavailable(_)
            | AgentError::Serialization(_)
            | AgentError::Http(_) => ErrorKind::ProviderUnavailable,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::MalformedSelection => "malformed_selection",
            ErrorKind::UnknownSeries => "unknown_series",
            ErrorKind::EmptySeries => "empty_series",
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::Config => "config",
        };
        f.write_str(label)
    }
}
