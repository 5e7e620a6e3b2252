//! Configuration loading and validation for the sealer service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use common::protocol::PassphraseSource;
use serde::Deserialize;

/// Passphrase used when `ENCRYPTION_KEY` is unset. Development only.
pub const DEV_DEFAULT_PASSPHRASE: &str = "dev-only-insecure-passphrase";

/// Validated sealer configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Codec passphrase. Falls back to [`DEV_DEFAULT_PASSPHRASE`] when unset
    /// or empty.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Whether the development passphrase may be used at all.
    #[serde(default = "default_allow_default_key")]
    pub allow_default_key: bool,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_allow_default_key() -> bool {
    true
}
fn default_listen_port() -> u16 {
    8080
}
fn default_max_body_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("allow_default_key", &self.allow_default_key)
            .field("listen_port", &self.listen_port)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder().add_source(config::Environment::default()))
    }

    fn load(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The passphrase to derive the codec key from, and where it came from.
    pub fn passphrase(&self) -> (&str, PassphraseSource) {
        match self.encryption_key.as_deref() {
            Some(key) if !key.is_empty() => (key, PassphraseSource::Configured),
            _ => (DEV_DEFAULT_PASSPHRASE, PassphraseSource::DevelopmentDefault),
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        let (_, source) = self.passphrase();
        if source == PassphraseSource::DevelopmentDefault && !self.allow_default_key {
            anyhow::bail!("ENCRYPTION_KEY is required when ALLOW_DEFAULT_KEY=false");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be empty when set");
            }
        }
        Ok(())
    }
}
