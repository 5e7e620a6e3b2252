//! Errors produced by the codec.

use thiserror::Error;

/// Errors produced by the codec layer.
///
/// None of the variants carry plaintext, envelope bytes, or key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input is not valid base64, is shorter than the fixed header, or
    /// decrypted to bytes that are not UTF-8.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// Tag verification failed: wrong passphrase, or the envelope was altered.
    #[error("envelope authentication failed")]
    AuthenticationFailed,

    /// Key derivation or cipher setup rejected its parameters. This is an
    /// environment or programming error, never a property of the input.
    #[error("codec misconfigured: {0}")]
    Misconfiguration(String),
}

impl CodecError {
    /// Returns `true` for errors caused by the caller's input rather than by
    /// the codec's own configuration.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, CodecError::Misconfiguration(_))
    }
}
