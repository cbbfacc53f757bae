//! Admin API client error types.

use mec_core::BackendError;

use crate::envelope::Envelope;

/// Errors from admin API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Method and path of the failed call.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status.
    #[error("admin API {endpoint} returned {status}: {body}")]
    ApiError {
        /// Method and path of the failed call.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The API answered `success: false`.
    #[error("admin API {endpoint} rejected the request: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// Method and path of the failed call.
        endpoint: String,
        /// The API's message, if it sent one.
        message: Option<String>,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// Method and path of the failed call.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The envelope decoded but its payload has the wrong shape.
    #[error("unexpected payload from {endpoint}: {source}")]
    Payload {
        /// Method and path of the failed call.
        endpoint: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Reading a local file for upload failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ApiError {
    /// The message the API attached to a refusal, if any. Non-2xx bodies
    /// are searched for an envelope `message` too.
    pub fn api_message(&self) -> Option<String> {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::ApiError { body, .. } => serde_json::from_str::<Envelope>(body)
                .ok()
                .and_then(|envelope| envelope.message),
            _ => None,
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Rejected { .. } | ApiError::ApiError { .. } => BackendError::Rejected {
                message: err.api_message(),
            },
            _ => BackendError::Transport {
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_carry_envelope_message() {
        let err = ApiError::ApiError {
            endpoint: "POST /clients".into(),
            status: 409,
            body: r#"{"success":false,"message":"Client already exists"}"#.into(),
        };
        assert_eq!(
            BackendError::from(err),
            BackendError::rejected("Client already exists")
        );
    }

    #[test]
    fn non_json_status_body_has_no_message() {
        let err = ApiError::ApiError {
            endpoint: "GET /works".into(),
            status: 502,
            body: "<html>Bad Gateway</html>".into(),
        };
        assert_eq!(
            BackendError::from(err),
            BackendError::Rejected { message: None }
        );
    }

    #[test]
    fn payload_errors_are_transport_failures() {
        let source = serde_json::from_str::<Vec<u8>>("{}").unwrap_err();
        let err = ApiError::Payload {
            endpoint: "GET /dashboard".into(),
            source,
        };
        assert!(!BackendError::from(err).is_rejection());
    }
}
