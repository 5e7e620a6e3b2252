//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, envelope, passphrase, or key material** may appear in any
//!   span attribute or log field. Lengths and error codes are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::{init_telemetry, shutdown};
