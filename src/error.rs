//! Error types surfaced by the adapter.

use thiserror::Error;

/// Failures of the outbound call to the origin.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be constructed.
    #[error("cannot build upstream request: {0}")]
    Build(String),

    /// Connection, proxy or origin failure.
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The outbound call exceeded its deadline.
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForwardError::Timeout(err)
        } else if err.is_builder() {
            ForwardError::Build(err.to_string())
        } else {
            ForwardError::Transport(err)
        }
    }
}

/// Errors returned to the event source.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Forward(#[from] ForwardError),

    /// The inbound event could not be decoded.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// A fault inside the handler, caught at the top boundary.
    #[error("internal fault: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Short, stable name used in error payloads and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Forward(ForwardError::Build(_)) => "UpstreamBuildError",
            AdapterError::Forward(ForwardError::Transport(_)) => "UpstreamTransportError",
            AdapterError::Forward(ForwardError::Timeout(_)) => "UpstreamTimeout",
            AdapterError::InvalidEvent(_) => "InvalidEvent",
            AdapterError::Internal(_) => "InternalFault",
        }
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
