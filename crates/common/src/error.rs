//! Common error types shared across crates.

use codec::CodecError;
use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthenticated`] → 422
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: invalid JSON or an envelope that does not parse.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The envelope parsed but its authentication tag did not verify.
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// The codec key has not been derived yet.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred, including a misconfigured codec.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthenticated(_) => 422,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthenticated(_) => "authentication_failed",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

impl From<CodecError> for ServiceError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::MalformedEnvelope(_) => ServiceError::BadRequest(e.to_string()),
            CodecError::AuthenticationFailed => ServiceError::Unauthenticated(e.to_string()),
            CodecError::Misconfiguration(_) => ServiceError::Internal(e.to_string()),
        }
    }
}
