//! Error types for the kiosk core.

use thiserror::Error;

/// Failure talking to an upstream HTTP API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream returned status {0}: {1}")]
    Status(u16, String),

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("upstream GraphQL error: {0}")]
    GraphQl(String),
}

impl UpstreamError {
    /// Classifies a transport error, keeping timeouts distinct.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("template has no element with id \"{0}\"")]
    MissingContainer(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration load failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("environment variable {0} must hold the transit API key")]
    MissingApiKey(String),

    #[error("unknown time zone: {0}")]
    InvalidTimezone(String),
}
