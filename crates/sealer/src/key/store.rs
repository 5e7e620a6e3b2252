//! [`KeyStore`]: shared handle to the codec once its key has been derived.

use std::sync::Arc;

use codec::Codec;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors produced by the key layer.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key has not yet been derived.
    #[error("codec key not yet derived")]
    NotInitialised,
}

/// Shared slot for the ready-to-use [`Codec`].
///
/// Handlers take a short read lock and clone the `Arc`; the lock is never
/// held across a cipher operation.
#[derive(Clone, Debug)]
pub struct KeyStore {
    inner: Arc<RwLock<Option<Arc<Codec>>>>,
}

impl KeyStore {
    /// Create a new, empty [`KeyStore`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns `true` once a codec has been stored.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Store (or replace) the codec.
    pub async fn store(&self, codec: Codec) {
        let mut lock = self.inner.write().await;
        *lock = Some(Arc::new(codec));
    }

    /// Borrow the current codec.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotInitialised`] if no codec has been stored yet.
    pub async fn current(&self) -> Result<Arc<Codec>, KeyError> {
        let lock = self.inner.read().await;
        lock.as_ref().cloned().ok_or(KeyError::NotInitialised)
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}
