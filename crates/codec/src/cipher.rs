//! The message codec: AES-256-GCM over UTF-8 text with a scrypt-derived key.
//!
//! Each [`Codec::encrypt`] call draws a fresh 64-byte salt and a fresh 16-byte
//! IV from the OS CSPRNG, seals the plaintext with no associated data, and
//! returns the base64 [`Envelope`]. The 16-byte IV is what existing envelopes
//! use, so the GCM counter block is derived through GHASH rather than the
//! 96-bit fast path.

use aes_gcm::{
    aead::{consts::U16, rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};

use crate::envelope::{Envelope, IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::CodecError;
use crate::kdf::{derive_key, KdfParams};

/// AES-256-GCM with a 128-bit IV and a 128-bit tag.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Seals and opens message text under one passphrase.
///
/// The key is derived once in the constructor and cached; both operations
/// are then pure CPU work with no shared mutable state, so one `Codec` can be
/// shared across threads behind an `Arc`.
#[derive(Clone)]
pub struct Codec {
    cipher: Aes256Gcm16,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Codec([REDACTED])")
    }
}

impl Codec {
    /// Build a codec for `passphrase` at the default scrypt cost.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Misconfiguration`] if the key cannot be derived.
    pub fn new(passphrase: &str) -> Result<Self, CodecError> {
        Self::with_params(passphrase, KdfParams::default())
    }

    /// Build a codec for `passphrase` at an explicit scrypt cost.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Misconfiguration`] if scrypt rejects `params` or
    /// the cipher rejects the derived key.
    pub fn with_params(passphrase: &str, params: KdfParams) -> Result<Self, CodecError> {
        let key = derive_key(passphrase.as_bytes(), params)?;
        let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
            .map_err(|_| CodecError::Misconfiguration("cipher rejected key length".into()))?;
        Ok(Self { cipher })
    }

    /// Seal `plaintext` into a base64 envelope.
    ///
    /// # Errors
    ///
    /// Only [`CodecError::Misconfiguration`], on an internal cipher failure.
    /// Any UTF-8 input, including the empty string, is accepted.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| CodecError::Misconfiguration("aead encryption failed".into()))?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        let envelope = Envelope {
            salt,
            iv,
            tag: tag_bytes,
            ciphertext: buffer,
        };
        Ok(envelope.encode())
    }

    /// Open a base64 envelope produced by [`Codec::encrypt`].
    ///
    /// No plaintext is returned unless the tag verifies.
    ///
    /// # Errors
    ///
    /// - [`CodecError::MalformedEnvelope`] if `envelope` is not base64, is
    ///   shorter than the header, or verified bytes are not UTF-8.
    /// - [`CodecError::AuthenticationFailed`] if the tag does not verify.
    pub fn decrypt(&self, envelope: &str) -> Result<String, CodecError> {
        let envelope = Envelope::decode(envelope)?;

        let mut buffer = envelope.ciphertext;
        self.cipher
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(&envelope.iv),
                b"",
                &mut buffer,
                Tag::<U16>::from_slice(&envelope.tag),
            )
            .map_err(|_| CodecError::AuthenticationFailed)?;

        String::from_utf8(buffer)
            .map_err(|_| CodecError::MalformedEnvelope("plaintext is not valid UTF-8"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::OnceLock;

    use aes_gcm::aead::rand_core::RngCore;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use proptest::prelude::*;

    use super::*;
    use crate::envelope::HEADER_LEN;

    /// Cheap scrypt cost so tests do not pay the production derivation.
    pub(crate) const FAST: KdfParams = KdfParams {
        log_n: 4,
        r: 8,
        p: 1,
    };

    pub(crate) fn shared_codec() -> &'static Codec {
        static CODEC: OnceLock<Codec> = OnceLock::new();
        CODEC.get_or_init(|| Codec::with_params("test passphrase", FAST).unwrap())
    }

    fn decoded_len(envelope: &str) -> usize {
        STANDARD.decode(envelope).unwrap().len()
    }

    // Sealed by the platform's existing message service with salt = 0x11 * 64
    // and iv = 00..0f.
    const KNOWN_HELLO: &str = "EREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREQABAgMEBQYHCAkKCwwNDg8st6qyZ/N/qMk4w1WnJhH4f3W7ghE=";
    const KNOWN_UNICODE: &str = "EREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREREQABAgMEBQYHCAkKCwwNDg9P4Xc7V1P32dQX54XVsZrGlxPLj6U6SxqzrzL3LtDg8Nw=";

    #[test]
    fn opens_envelope_sealed_by_existing_deployment() {
        let codec = Codec::new("dev-only-insecure-passphrase").unwrap();
        assert_eq!(codec.decrypt(KNOWN_HELLO).unwrap(), "hello");
    }

    #[test]
    fn opens_multibyte_envelope_sealed_by_existing_deployment() {
        let codec = Codec::new("correct horse battery staple").unwrap();
        assert_eq!(codec.decrypt(KNOWN_UNICODE).unwrap(), "héllo wörld ✓");
    }

    #[test]
    fn hello_scenario() {
        let codec = shared_codec();
        let envelope = codec.encrypt("hello").unwrap();
        assert_eq!(envelope.len(), 136);
        assert_eq!(decoded_len(&envelope), 101);
        assert_eq!(codec.decrypt(&envelope).unwrap(), "hello");
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let codec = shared_codec();
        let envelope = codec.encrypt("").unwrap();
        assert_eq!(decoded_len(&envelope), HEADER_LEN);
        assert_eq!(codec.decrypt(&envelope).unwrap(), "");
    }

    #[test]
    fn multibyte_plaintext_round_trips() {
        let codec = shared_codec();
        let text = "研究ノート 🔬 — Ünïcødé";
        let envelope = codec.encrypt(text).unwrap();
        assert_eq!(decoded_len(&envelope), HEADER_LEN + text.len());
        assert_eq!(codec.decrypt(&envelope).unwrap(), text);
    }

    #[test]
    fn megabyte_plaintext_round_trips() {
        let codec = shared_codec();
        let text = "peer review ✓ ".repeat(80_000);
        assert!(text.len() >= 1 << 20);
        let envelope = codec.encrypt(&text).unwrap();
        assert_eq!(decoded_len(&envelope), HEADER_LEN + text.len());
        assert_eq!(codec.decrypt(&envelope).unwrap(), text);
    }

    #[test]
    fn sealing_twice_gives_distinct_envelopes() {
        let codec = shared_codec();
        let a = codec.encrypt("same").unwrap();
        let b = codec.encrypt("same").unwrap();
        assert_ne!(a, b);

        let (ea, eb) = (Envelope::decode(&a).unwrap(), Envelope::decode(&b).unwrap());
        assert_ne!(ea.salt, eb.salt);
        assert_ne!(ea.iv, eb.iv);
        assert_eq!(codec.decrypt(&a).unwrap(), "same");
        assert_eq!(codec.decrypt(&b).unwrap(), "same");
    }

    #[test]
    fn every_tag_and_ciphertext_bit_flip_is_rejected() {
        let codec = shared_codec();
        let bytes = STANDARD.decode(codec.encrypt("hello").unwrap()).unwrap();
        let tag_start = HEADER_LEN - TAG_LEN;

        for byte in tag_start..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[byte] ^= 1 << bit;
                assert_eq!(
                    codec.decrypt(&STANDARD.encode(&tampered)),
                    Err(CodecError::AuthenticationFailed),
                    "flip at byte {byte} bit {bit} was not detected"
                );
            }
        }
    }

    #[test]
    fn iv_bit_flip_is_rejected() {
        let codec = shared_codec();
        let mut bytes = STANDARD.decode(codec.encrypt("hello").unwrap()).unwrap();
        bytes[SALT_LEN] ^= 0x01;
        assert_eq!(
            codec.decrypt(&STANDARD.encode(&bytes)),
            Err(CodecError::AuthenticationFailed)
        );
    }

    #[test]
    fn salt_is_not_authenticated() {
        // The per-envelope salt is carried but unused, so altering it is
        // invisible to the tag.
        let codec = shared_codec();
        let mut bytes = STANDARD.decode(codec.encrypt("hello").unwrap()).unwrap();
        bytes[0] ^= 0xFF;
        assert_eq!(codec.decrypt(&STANDARD.encode(&bytes)).unwrap(), "hello");
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        let alice = Codec::with_params("passphrase A", FAST).unwrap();
        let bob = Codec::with_params("passphrase B", FAST).unwrap();
        let envelope = alice.encrypt("confidential").unwrap();
        assert_eq!(bob.decrypt(&envelope), Err(CodecError::AuthenticationFailed));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let codec = shared_codec();
        assert!(matches!(
            codec.decrypt("not-base64!!"),
            Err(CodecError::MalformedEnvelope(_))
        ));

        let mut short = [0u8; 50];
        OsRng.fill_bytes(&mut short);
        assert!(matches!(
            codec.decrypt(&STANDARD.encode(short)),
            Err(CodecError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn header_only_envelope_with_bad_tag_is_rejected() {
        let codec = shared_codec();
        let envelope = STANDARD.encode([0u8; HEADER_LEN]);
        assert_eq!(codec.decrypt(&envelope), Err(CodecError::AuthenticationFailed));
    }

    #[test]
    fn non_utf8_payload_is_malformed() {
        let codec = shared_codec();
        let iv = [9u8; IV_LEN];
        let mut buffer = vec![0xFF, 0xFE, 0xFD];
        let tag = codec
            .cipher
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
            .unwrap();
        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);
        let envelope = Envelope {
            salt: [0u8; SALT_LEN],
            iv,
            tag: tag_bytes,
            ciphertext: buffer,
        };
        assert!(matches!(
            codec.decrypt(&envelope.encode()),
            Err(CodecError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn codec_redacted_in_debug() {
        assert_eq!(format!("{:?}", shared_codec()), "Codec([REDACTED])");
    }

    #[test]
    fn codec_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec>();

        let codec = std::sync::Arc::new(shared_codec().clone());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let codec = codec.clone();
                std::thread::spawn(move || {
                    let text = format!("thread {i}");
                    let envelope = codec.encrypt(&text).unwrap();
                    assert_eq!(codec.decrypt(&envelope).unwrap(), text);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }

    proptest! {
        #[test]
        fn round_trip_any_text(text in ".*") {
            let codec = shared_codec();
            let envelope = codec.encrypt(&text).unwrap();
            prop_assert_eq!(decoded_len(&envelope), HEADER_LEN + text.len());
            prop_assert_eq!(codec.decrypt(&envelope).unwrap(), text);
        }
    }
}
