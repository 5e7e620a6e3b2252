//! Authenticated symmetric codec for message content at rest.
//!
//! A passphrase is stretched with scrypt into an AES-256 key; text is sealed
//! with AES-256-GCM into a self-contained base64 envelope.
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[64] ∥ iv[16] ∥ tag[16] ∥ ciphertext[N] )
//! ```
//!
//! Decryption fails closed: any altered IV, tag, or ciphertext byte, or a
//! different passphrase, is reported as [`CodecError::AuthenticationFailed`].
//!
//! The codec does no I/O and reads no environment; the passphrase is passed
//! to [`Codec::new`] by the caller.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod field;
pub mod kdf;

pub use cipher::Codec;
pub use envelope::{Envelope, HEADER_LEN};
pub use error::CodecError;
pub use field::{DecryptFailurePolicy, SealedField};
pub use kdf::{KdfParams, KEY_LEN};
