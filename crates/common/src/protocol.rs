//! Request and response types exchanged with the sealer service.
//!
//! All bodies are JSON. Envelopes travel as the opaque base64 strings the
//! codec produces; callers persist them as-is.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Message text to seal. May be empty.
    pub plaintext: String,
}

/// Successful response body for `POST /encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Base64 envelope.
    pub envelope: String,
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Base64 envelope previously returned by `POST /encrypt`.
    pub envelope: String,
}

/// Successful response body for `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Where the codec passphrase came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassphraseSource {
    /// `ENCRYPTION_KEY` was set.
    Configured,
    /// `ENCRYPTION_KEY` was unset; the built-in development passphrase is in use.
    DevelopmentDefault,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the codec key has been derived.
    pub key_ready: bool,
    /// Where the passphrase came from.
    pub passphrase_source: PassphraseSource,
}
