//! Real-time Error Types
//!
//! Failures never close the socket; they are reported to the sender as an
//! `error` event.

use catalog::CatalogError;
use thiserror::Error;

pub type RealtimeResult<T> = Result<T, RealtimeError>;

#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Frame was not a known `{event, data}` envelope
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Message text must not be empty")]
    EmptyMessage,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl RealtimeError {
    /// Text sent back in the `error` event
    pub fn client_message(&self) -> String {
        match self {
            // Keep storage details out of client events
            RealtimeError::Catalog(e) if e.kind().is_server_error() => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn log(&self) {
        match self {
            RealtimeError::Catalog(e) => e.log(),
            other => tracing::debug!(error = %other, "Rejected socket event"),
        }
    }
}
