//! Binary layout of a sealed message and its base64 text form.
//!
//! ```text
//! offset  0      64     80     96                 end
//!         | salt | iv   | tag  | ciphertext ...    |
//!           64     16     16     = plaintext length
//! ```
//!
//! The whole byte sequence is carried as standard, padded base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::CodecError;

/// Length of the per-envelope random salt.
pub const SALT_LEN: usize = 64;

/// Length of the AES-GCM initialization vector.
pub const IV_LEN: usize = 16;

/// Length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Fixed header length; the smallest possible envelope (empty plaintext).
pub const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

const IV_OFFSET: usize = SALT_LEN;
const TAG_OFFSET: usize = IV_OFFSET + IV_LEN;
const CIPHERTEXT_OFFSET: usize = TAG_OFFSET + TAG_LEN;

/// A parsed envelope. Immutable once built; it has no identity beyond its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Random per-envelope salt. Carried for format symmetry; it is not an
    /// input to key derivation.
    pub salt: [u8; SALT_LEN],
    /// Random per-envelope IV.
    pub iv: [u8; IV_LEN],
    /// GCM authentication tag over the ciphertext.
    pub tag: [u8; TAG_LEN],
    /// Encrypted payload, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialise as `salt ∥ iv ∥ tag ∥ ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Encode to the base64 text stored by callers.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Slice raw envelope bytes at the fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedEnvelope`] if `bytes` is shorter than
    /// [`HEADER_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::MalformedEnvelope("shorter than envelope header"));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[..IV_OFFSET]);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[IV_OFFSET..TAG_OFFSET]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[TAG_OFFSET..CIPHERTEXT_OFFSET]);

        Ok(Self {
            salt,
            iv,
            tag,
            ciphertext: bytes[CIPHERTEXT_OFFSET..].to_vec(),
        })
    }

    /// Parse the base64 text form.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedEnvelope`] if `encoded` is not valid
    /// padded base64 or decodes to fewer than [`HEADER_LEN`] bytes.
    pub fn decode(encoded: &str) -> Result<Self, CodecError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| CodecError::MalformedEnvelope("invalid base64"))?;
        Self::from_bytes(&bytes)
    }
}
