//! `sealer` — message sealing service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Derive the codec key from the passphrase and seed [`KeyStore`].
//! 4. Build the Axum router and serve until SIGINT/SIGTERM.

mod config;
mod key;
mod server;
mod telemetry;

use anyhow::Result;
use common::protocol::PassphraseSource;
use tracing::{info, warn};

use crate::config::Config;
use crate::key::KeyStore;
use crate::server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "sealer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key derivation
    // -----------------------------------------------------------------------
    let (passphrase, passphrase_source) = cfg.passphrase();
    if passphrase_source == PassphraseSource::DevelopmentDefault {
        warn!("ENCRYPTION_KEY is not set; using the development passphrase");
    }
    let key_store = KeyStore::new();
    key::derive_and_store(passphrase, &key_store).await?;

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(key_store, passphrase_source);
    let router = server::router::build(state, cfg.max_body_bytes);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sealer stopped");
    telemetry::shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
