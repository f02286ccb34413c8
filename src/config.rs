//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides. The
//! browser build only uses the defaults.

use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;

#[cfg(feature = "native")]
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub contract: ContractConfig,

    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployed contract configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_contract_address")]
    pub address: Address,

    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Delay between receipt and log polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Address baked in at build time, if any
fn default_contract_address() -> Address {
    option_env!("WAVE_PORTAL_CONTRACT")
        .and_then(|s| s.parse().ok())
        .unwrap_or(Address::ZERO)
}

fn default_gas_limit() -> u64 {
    300_000
}

fn default_poll_interval() -> u64 {
    2000
}

impl ContractConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: default_contract_address(),
            gas_limit: default_gas_limit(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// JSON-RPC node used by the native hosts
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl RpcConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// How long an error banner stays up
    #[serde(default = "default_notice_timeout")]
    pub notice_timeout_ms: u64,
}

fn default_notice_timeout() -> u64 {
    3000
}

impl UiConfig {
    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_timeout_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_timeout_ms: default_notice_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

#[cfg(feature = "native")]
impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("wave-portal").join("config.toml")),
            Some(PathBuf::from("/etc/wave-portal/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// An explicit path must load; otherwise fall back to the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var("WAVE_PORTAL_CONTRACT") {
            match address.parse() {
                Ok(a) => self.contract.address = a,
                Err(e) => tracing::warn!("Ignoring WAVE_PORTAL_CONTRACT {:?}: {}", address, e),
            }
        }
        if let Ok(gas) = std::env::var("WAVE_PORTAL_GAS_LIMIT") {
            if let Ok(g) = gas.parse() {
                self.contract.gas_limit = g;
            }
        }

        if let Ok(url) = std::env::var("WAVE_PORTAL_RPC_URL") {
            self.rpc.url = url;
        }

        if let Ok(level) = std::env::var("WAVE_PORTAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WAVE_PORTAL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[cfg(feature = "native")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Wave Portal Configuration
#
# Environment variables override these settings:
# - WAVE_PORTAL_CONTRACT
# - WAVE_PORTAL_GAS_LIMIT
# - WAVE_PORTAL_RPC_URL
# - WAVE_PORTAL_LOG_LEVEL
# - WAVE_PORTAL_LOG_FORMAT

[contract]
# Address of the deployed WavePortal contract
# address = "0x0000000000000000000000000000000000000000"

# Gas limit sent with every wave
gas_limit = 300000

# How often to poll for receipts and new waves (ms)
poll_interval_ms = 2000

[rpc]
# JSON-RPC endpoint with unlocked accounts
url = "http://127.0.0.1:8545"

# Request timeout in seconds
request_timeout_secs = 30

[ui]
# How long error banners stay visible (ms)
notice_timeout_ms = 3000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/wave-portal/wave-portal.log"
"#
    .to_string()
}
