//! Stored message fields and what to do when one will not open.
//!
//! Callers persist a [`SealedField`] per message: the stored text plus a flag
//! saying whether it is an envelope. Legacy rows written before encryption
//! was enabled carry `is_encrypted = false` and are returned untouched.

use serde::{Deserialize, Serialize};

use crate::cipher::Codec;
use crate::error::CodecError;

/// A persisted text value and whether it is a codec envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedField {
    /// Either plaintext or a base64 envelope, per `is_encrypted`.
    pub value: String,
    /// `true` if `value` is an envelope.
    pub is_encrypted: bool,
}

impl SealedField {
    /// Wrap a value stored without encryption.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_encrypted: false,
        }
    }
}

/// How [`Codec::open`] reacts when an encrypted field fails to open.
///
/// There is no implicit choice: callers that want the legacy behaviour of
/// showing the stored blob must ask for [`DecryptFailurePolicy::Passthrough`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DecryptFailurePolicy {
    /// Propagate the error.
    #[default]
    Reject,
    /// Return this text instead.
    Placeholder(String),
    /// Return the stored envelope verbatim.
    Passthrough,
}

impl Codec {
    /// Encrypt `plaintext` into a field ready to persist.
    ///
    /// # Errors
    ///
    /// See [`Codec::encrypt`].
    pub fn seal(&self, plaintext: &str) -> Result<SealedField, CodecError> {
        Ok(SealedField {
            value: self.encrypt(plaintext)?,
            is_encrypted: true,
        })
    }

    /// Read a stored field back to text.
    ///
    /// Input errors ([`CodecError::MalformedEnvelope`],
    /// [`CodecError::AuthenticationFailed`]) are handled per `policy`;
    /// [`CodecError::Misconfiguration`] is always returned.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] not absorbed by `policy`.
    pub fn open(
        &self,
        field: &SealedField,
        policy: &DecryptFailurePolicy,
    ) -> Result<String, CodecError> {
        if !field.is_encrypted {
            return Ok(field.value.clone());
        }

        apply_policy(self.decrypt(&field.value), field, policy)
    }
}

/// Resolve a decrypt outcome for `field` under `policy`.
///
/// Kept apart from [`Codec::open`] so the misconfiguration rule holds for any
/// error the codec may surface, not only the ones `decrypt` produces today.
fn apply_policy(
    outcome: Result<String, CodecError>,
    field: &SealedField,
    policy: &DecryptFailurePolicy,
) -> Result<String, CodecError> {
    match outcome {
        Ok(plaintext) => Ok(plaintext),
        Err(e) if !e.is_input_error() => Err(e),
        Err(e) => match policy {
            DecryptFailurePolicy::Reject => Err(e),
            DecryptFailurePolicy::Placeholder(text) => Ok(text.clone()),
            DecryptFailurePolicy::Passthrough => Ok(field.value.clone()),
        },
    }
}
