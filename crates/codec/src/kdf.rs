//! Passphrase → AES-256 key derivation.
//!
//! The key is scrypt over the passphrase with the constant salt
//! [`DERIVATION_SALT`]. Every envelope sealed under one passphrase therefore
//! shares one key; the random salt stored in each envelope plays no part here.

use zeroize::Zeroizing;

use crate::error::CodecError;

/// Byte length of the derived AES-256 key.
pub const KEY_LEN: usize = 32;

/// Constant scrypt salt shared by every derivation.
pub const DERIVATION_SALT: &[u8] = b"salt";

/// scrypt cost parameters.
///
/// [`KdfParams::default`] is N = 2^14, r = 8, p = 1, which existing envelopes
/// were sealed with. Changing it changes the derived key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost N.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

/// A derived key. Zeroed on drop, never printed.
#[derive(Clone)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the cipher key for `passphrase`.
///
/// This is deliberately slow (tens of milliseconds at the default cost).
/// Derive once per passphrase and reuse the result.
///
/// # Errors
///
/// Returns [`CodecError::Misconfiguration`] if scrypt rejects `params`.
pub fn derive_key(passphrase: &[u8], params: KdfParams) -> Result<DerivedKey, CodecError> {
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, KEY_LEN)
        .map_err(|e| CodecError::Misconfiguration(format!("scrypt parameters: {e}")))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(passphrase, DERIVATION_SALT, &scrypt_params, key.as_mut())
        .map_err(|e| CodecError::Misconfiguration(format!("scrypt output: {e}")))?;

    Ok(DerivedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn default_params_match_existing_deployments() {
        let key = derive_key(b"dev-only-insecure-passphrase", KdfParams::default()).unwrap();
        assert_eq!(
            hex(key.as_bytes()),
            "0801a994b9a9d96f3bf756fbb5f2400e813b26ecb2e8518b4658dbe37006c0ac"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let params = KdfParams {
            log_n: 4,
            ..KdfParams::default()
        };
        let a = derive_key(b"passphrase", params).unwrap();
        let b = derive_key(b"passphrase", params).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_passphrases_give_different_keys() {
        let params = KdfParams {
            log_n: 4,
            ..KdfParams::default()
        };
        let a = derive_key(b"alpha", params).unwrap();
        let b = derive_key(b"bravo", params).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn invalid_params_are_misconfiguration() {
        let params = KdfParams {
            log_n: 0,
            r: 0,
            p: 0,
        };
        assert!(matches!(
            derive_key(b"x", params),
            Err(CodecError::Misconfiguration(_))
        ));
    }

    #[test]
    fn key_redacted_in_debug() {
        let params = KdfParams {
            log_n: 4,
            ..KdfParams::default()
        };
        let key = derive_key(b"x", params).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
