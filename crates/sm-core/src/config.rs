//! Configuration types and loading
//!
//! Layers built-in defaults, an optional TOML file, and `SEW4MI__*` environment variables.

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::types::Currency;

/// Default config file looked up when `SEW4MI_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "sew4mi.toml";

/// Bounds accepted for `estimation.buffer_multiplier`
pub const MIN_BUFFER_MULTIPLIER: f64 = 1.0;
pub const MAX_BUFFER_MULTIPLIER: f64 = 10.0;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Completion estimate tuning
    pub estimation: EstimationConfig,

    /// Escrow payment split
    pub escrow: EscrowConfig,

    /// Instance-specific settings
    pub instance: InstanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    /// How long a health report is served from cache
    pub health_cache_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimationConfig {
    /// Multiplier applied to the remaining typical stage days
    pub buffer_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EscrowConfig {
    pub deposit_percent: u8,
    pub fitting_percent: u8,
    pub final_percent: u8,
    pub currency: Currency,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    /// Application title
    pub app_title: String,
    /// Time zone
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_seconds: 30,
                health_cache_seconds: 10,
            },
            estimation: EstimationConfig {
                buffer_multiplier: 1.2,
            },
            escrow: EscrowConfig {
                deposit_percent: 25,
                fitting_percent: 50,
                final_percent: 25,
                currency: Currency::Ghs,
            },
            instance: InstanceConfig {
                app_title: "Sew4Mi".to_string(),
                timezone: "Africa/Accra".to_string(),
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config source error: {0}")]
    Source(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Source(err.to_string())
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, and the environment
    ///
    /// The file path comes from `SEW4MI_CONFIG`, falling back to [`DEFAULT_CONFIG_FILE`].
    /// A missing file is not an error. `HOST` and `PORT` override the layered values.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SEW4MI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config: AppConfig = Self::defaults_builder()?
            .add_source(File::new(&path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SEW4MI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("{port:?} is not a valid port"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Layer a TOML document over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Self::defaults_builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;
        Ok(Config::builder().add_source(defaults))
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let escrow = &self.escrow;
        let sum = escrow.deposit_percent as u16
            + escrow.fitting_percent as u16
            + escrow.final_percent as u16;
        if sum != 100 {
            return Err(ConfigError::InvalidValue {
                key: "escrow".to_string(),
                message: format!("percentages must sum to 100, got {sum}"),
            });
        }

        let buffer = self.estimation.buffer_multiplier;
        if !(MIN_BUFFER_MULTIPLIER..=MAX_BUFFER_MULTIPLIER).contains(&buffer) {
            return Err(ConfigError::InvalidValue {
                key: "estimation.buffer_multiplier".to_string(),
                message: format!(
                    "must be between {MIN_BUFFER_MULTIPLIER} and {MAX_BUFFER_MULTIPLIER}, got {buffer}"
                ),
            });
        }

        Ok(())
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}
