//! Error types for controller, configuration and reply handling.

use crate::controller::SessionId;
use thiserror::Error;

pub type Result<T, E = SuggestError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum SuggestError {
    /// Operation on a session that was never bound or has been unbound
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// A required configuration key is absent
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// A configuration value is present but unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The candidate service answered with a non-OK status
    #[error("service error ({code}): {message}")]
    Service { code: String, message: String },

    /// The reply parsed as JSON but matched none of the recognized shapes
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Network or worker failure before a reply was produced
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SuggestError {
    /// Transport failures follow the timeout path; everything else aborts the fetch.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_names_the_session() {
        let err = SuggestError::UnknownSession(SessionId::from_raw(7));
        assert_eq!(err.to_string(), "unknown session: #7");
    }

    #[test]
    fn transport_classification() {
        assert!(SuggestError::Transport("reset".into()).is_transport());
        assert!(!SuggestError::MalformedResponse("x".into()).is_transport());
    }
}
