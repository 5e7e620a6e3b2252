//! Shared application state injected into every Axum handler.

use common::protocol::PassphraseSource;

use crate::key::KeyStore;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the key store is `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    /// Slot holding the codec once its key is derived.
    pub key_store: KeyStore,
    /// Where the passphrase came from; reported by `/health`.
    pub passphrase_source: PassphraseSource,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(key_store: KeyStore, passphrase_source: PassphraseSource) -> Self {
        Self {
            key_store,
            passphrase_source,
        }
    }
}

impl Default for AppState {
    /// Empty key store on the development passphrase, suitable for tests.
    fn default() -> Self {
        Self::new(KeyStore::new(), PassphraseSource::DevelopmentDefault)
    }
}
