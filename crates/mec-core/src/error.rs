//! # Error Types
//!
//! Errors shared by every crate that talks to the admin backend.

use thiserror::Error;

/// Failure reported by an [`AdminBackend`](crate::AdminBackend) call.
///
/// The remote API answers every call with a `{success, message?}` envelope.
/// A request that never produced such an envelope is a transport failure;
/// an envelope with `success: false` is a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request did not produce a usable response (connection failure,
    /// timeout, undecodable body).
    #[error("transport failure: {reason}")]
    Transport {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The backend answered and refused the operation.
    #[error("rejected by backend: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
}

impl BackendError {
    /// Construct a transport failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Construct a rejection carrying a backend message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    /// The backend-provided message, if the backend supplied one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref(),
            Self::Transport { .. } => None,
        }
    }

    /// Whether the backend answered (as opposed to the request being lost).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Validation errors for identifier newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Record identifiers are assigned by the backend and never blank.
    #[error("record identifier must not be blank")]
    BlankRecordId,

    /// Asset references are backend-issued URLs and never blank.
    #[error("asset reference must not be blank")]
    BlankAssetUrl,

    /// Entity kind name not recognised.
    #[error("unknown entity kind: \"{0}\"")]
    UnknownEntityKind(String),
}
