//! Kiosk configuration.
//!
//! Settings come from an INI file layered with environment variables. An
//! environment variable wins over the file:
//!
//! ```text
//! KIOSKGATE__NETWORK__SERVER_FQDN=directory.example.com
//! KIOSKGATE__SOFTWARE__LICENSE_KEY=0123abcd
//! KIOSKGATE__READER__ATTACH_TIMEOUT_MS=5000
//! ```
//!
//! # Example
//!
//! ```no_run
//! use kioskgate::KioskConfig;
//!
//! let config = KioskConfig::load("kioskgate.ini").expect("configuration");
//! println!("directory at {}", config.network.server_fqdn);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Prefix of environment variables that override the file.
pub const ENV_PREFIX: &str = "KIOSKGATE";

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or parsed, or a section or key is missing.
    #[error("configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    /// A required value is present but empty.
    #[error("required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct KioskConfig {
    pub network: NetworkConfig,
    pub software: SoftwareConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// `[network]`: where the employee directory lives.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Host (and optional port) of the directory, without scheme or path.
    pub server_fqdn: String,
}

/// `[software]`: credentials.
#[derive(Clone, Deserialize)]
pub struct SoftwareConfig {
    /// API token sent with every directory lookup.
    pub license_key: String,
}

impl std::fmt::Debug for SoftwareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareConfig")
            .field("license_key", &"<redacted>")
            .finish()
    }
}

/// `[reader]`: hardware timing. Optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub attach_timeout_ms: u64,
    pub event_buffer: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            attach_timeout_ms: 10_000,
            event_buffer: 16,
        }
    }
}

impl ReaderConfig {
    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }
}

impl KioskConfig {
    /// Loads and validates the configuration from `path` and the
    /// environment.
    ///
    /// # Errors
    /// [`ConfigError::Load`] if the file is missing or malformed, or a
    /// required key is absent. [`ConfigError::MissingRequired`] or
    /// [`ConfigError::Invalid`] if a value fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            path.as_ref(),
            config::Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
    }

    /// Like [`load`](Self::load), with an explicit environment source.
    pub fn load_with_env(
        path: &Path,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Ini))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(path = %path.display(), server = %config.network.server_fqdn, "configuration loaded");
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.server_fqdn.trim().is_empty() {
            return Err(ConfigError::MissingRequired("network.server_fqdn"));
        }
        if self.software.license_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("software.license_key"));
        }
        if self.reader.attach_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "reader.attach_timeout_ms",
                reason: "must be greater than zero",
            });
        }
        if self.reader.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "reader.event_buffer",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}
