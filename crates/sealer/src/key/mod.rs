//! Passphrase → codec key derivation and the shared key slot.
//!
//! # Lifecycle
//!
//! 1. At startup, [`derive_and_store`] runs scrypt over the configured
//!    passphrase on a blocking thread and stores the resulting [`Codec`].
//! 2. The derived key lives only in memory, inside the codec's cipher state.
//! 3. Handlers borrow the codec via [`KeyStore::current`].
//!
//! # Security invariants
//!
//! - The passphrase and derived key are **never** logged or included in traces.
//! - The passphrase copy handed to the blocking task is zeroed on drop.

pub mod store;

pub use store::KeyStore;

use std::time::Instant;

use anyhow::{Context, Result};
use codec::Codec;
use tracing::info;
use zeroize::Zeroizing;

/// Derive the codec key from `passphrase` and store the codec in `store`.
///
/// scrypt is CPU- and memory-bound, so it runs on Tokio's blocking pool.
///
/// # Errors
///
/// Returns an error if the blocking task panics or the codec rejects its
/// parameters.
pub async fn derive_and_store(passphrase: &str, store: &KeyStore) -> Result<()> {
    let passphrase = Zeroizing::new(passphrase.to_owned());
    let started = Instant::now();

    let codec = tokio::task::spawn_blocking(move || Codec::new(&passphrase))
        .await
        .context("key derivation task failed")?
        .context("failed to derive codec key")?;

    store.store(codec).await;
    info!(elapsed = ?started.elapsed(), "codec key derived");
    Ok(())
}
