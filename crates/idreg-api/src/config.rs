//! # Service Configuration
//!
//! All settings come from environment variables. Unset variables fall back
//! to defaults; set-but-invalid variables are an error, never silently
//! ignored.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `IDREG_PORT` | `8080` |
//! | `IDREG_GENESIS_ADMIN` | [`idreg_core::GENESIS_ADMIN`] |
//! | `IDREG_AUTH_TOKEN` | unset (gateway auth disabled) |
//! | `IDREG_START_HEIGHT` | `1` |
//! | `IDREG_METRICS_ENABLED` | `true` |

use idreg_core::{BlockHeight, Principal, ValidationError};
use idreg_state::DEFAULT_START_HEIGHT;
use thiserror::Error;

/// Runtime configuration for the API service.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Administrator installed when the registry is created.
    pub genesis_admin: Principal,
    /// Bearer token the upstream gateway must present.
    /// If `None`, gateway authentication is disabled.
    pub auth_token: Option<String>,
    /// Ledger height the first transaction executes at.
    pub start_height: BlockHeight,
    /// Whether to install the Prometheus recorder and serve `/metrics`.
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("genesis_admin", &self.genesis_admin)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("start_height", &self.start_height)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            genesis_admin: Principal::genesis_admin(),
            auth_token: None,
            start_height: DEFAULT_START_HEIGHT,
            metrics_enabled: true,
        }
    }
}

/// A configuration variable was set to an unusable value.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `IDREG_PORT` is not a valid port number.
    #[error("IDREG_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    /// `IDREG_GENESIS_ADMIN` is not a valid principal.
    #[error("IDREG_GENESIS_ADMIN is not a valid principal: {0}")]
    InvalidGenesisAdmin(#[source] ValidationError),

    /// `IDREG_AUTH_TOKEN` is set but empty.
    #[error("IDREG_AUTH_TOKEN is set but empty; unset it to disable gateway auth")]
    EmptyAuthToken,

    /// `IDREG_START_HEIGHT` is not an unsigned integer below `u64::MAX`.
    #[error("IDREG_START_HEIGHT must be an unsigned integer below {max}, got {0:?}", max = u64::MAX)]
    InvalidStartHeight(String),

    /// A boolean variable holds something other than true/false.
    #[error("{var} must be true or false, got {value:?}")]
    InvalidBool {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
    },
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("IDREG_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(v))?,
            None => defaults.port,
        };

        let genesis_admin = match lookup("IDREG_GENESIS_ADMIN") {
            Some(v) => Principal::new(v).map_err(ConfigError::InvalidGenesisAdmin)?,
            None => defaults.genesis_admin,
        };

        let auth_token = match lookup("IDREG_AUTH_TOKEN") {
            Some(v) if v.is_empty() => return Err(ConfigError::EmptyAuthToken),
            Some(v) => Some(v),
            None => None,
        };

        let start_height = match lookup("IDREG_START_HEIGHT") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                // Heights saturate at u64::MAX; starting there would stamp
                // every record with the same issued_at.
                .filter(|h| *h < u64::MAX)
                .map(BlockHeight)
                .ok_or(ConfigError::InvalidStartHeight(v))?,
            None => defaults.start_height,
        };

        let metrics_enabled = match lookup("IDREG_METRICS_ENABLED") {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        var: "IDREG_METRICS_ENABLED",
                        value: v,
                    })
                }
            },
            None => defaults.metrics_enabled,
        };

        Ok(Self {
            port,
            genesis_admin,
            auth_token,
            start_height,
            metrics_enabled,
        })
    }
}
