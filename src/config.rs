//! Configuration types for the ORC wallet core
//!
//! Manages global configuration: Esplora/mempool endpoints, the ORC backend
//! used for broadcast, UTXO and fee policy, and the local data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default ORC backend base URL
pub const DEFAULT_BACKEND_URL: &str = "https://orc-backend.railway.app/api/v1";

/// Global wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub bitcoin: BitcoinConfig,
    pub backend: BackendConfig,
    /// Optional custom data directory (persisted connection record lives here)
    pub data_dir: Option<String>,
}

/// Bitcoin data source and transaction policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinConfig {
    /// Explicit Esplora URL. When unset, the endpoint is derived from the
    /// address prefix of each request.
    pub esplora_url: Option<String>,

    /// Network for requests that carry no address: fee tiers and raw
    /// transaction broadcast. Mainnet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkType>,

    /// Smallest UTXO value (sats) the selector will pick
    pub min_utxo_value: u64,

    /// Fee rate (sat/vB) used whenever the fee service is unavailable
    pub default_fee_rate: u64,

    /// Delay before the single UTXO fetch retry
    pub retry_delay_ms: u64,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

/// ORC backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
}

/// Bitcoin network reported by a signing provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    /// Accepts the names providers actually report: Unisat answers
    /// `livenet` for mainnet, and testnet variants collapse to `Testnet`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "livenet" | "bitcoin" => Ok(NetworkType::Mainnet),
            "testnet" | "testnet4" | "signet" => Ok(NetworkType::Testnet),
            "regtest" => Ok(NetworkType::Regtest),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkType::Mainnet => write!(f, "mainnet"),
            NetworkType::Testnet => write!(f, "testnet"),
            NetworkType::Regtest => write!(f, "regtest"),
        }
    }
}

impl From<NetworkType> for ::bitcoin::Network {
    fn from(network: NetworkType) -> Self {
        match network {
            NetworkType::Mainnet => ::bitcoin::Network::Bitcoin,
            NetworkType::Testnet => ::bitcoin::Network::Testnet,
            NetworkType::Regtest => ::bitcoin::Network::Regtest,
        }
    }
}

impl BitcoinConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn network(&self) -> NetworkType {
        self.network.unwrap_or(NetworkType::Mainnet)
    }
}

impl Default for BitcoinConfig {
    fn default() -> Self {
        Self {
            esplora_url: None,
            network: None,
            min_utxo_value: 1000,
            default_fee_rate: 10,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

impl GlobalConfig {
    /// Create configuration pinned to a local regtest Esplora
    pub fn default_regtest() -> Self {
        Self {
            bitcoin: BitcoinConfig {
                esplora_url: Some("http://localhost:3002".to_string()),
                network: Some(NetworkType::Regtest),
                ..BitcoinConfig::default()
            },
            backend: BackendConfig::default(),
            data_dir: None,
        }
    }

    /// Create configuration that follows address prefixes to mempool.space
    pub fn default_public() -> Self {
        Self {
            bitcoin: BitcoinConfig::default(),
            backend: BackendConfig::default(),
            data_dir: None,
        }
    }

    /// Validate policy values that would otherwise fail deep inside a flow
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bitcoin.default_fee_rate == 0 {
            return Err(ConfigError::Invalid(
                "default_fee_rate must be positive".to_string(),
            ));
        }
        if self.bitcoin.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend url is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::default_public()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Config directory not found")]
    DirectoryNotFound,
}

/// Configuration overrides from CLI arguments or environment variables
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Network for fee and raw broadcast requests; regtest also pins the
    /// Esplora URL to the local default
    pub network: Option<NetworkType>,
    pub esplora_url: Option<String>,
    pub backend_url: Option<String>,
    pub data_dir: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create overrides from environment variables
    pub fn from_env() -> Self {
        Self {
            network: std::env::var("BITCOIN_NETWORK")
                .ok()
                .and_then(|s| s.parse().ok()),
            esplora_url: std::env::var("ESPLORA_URL").ok(),
            backend_url: std::env::var("ORC_BACKEND_URL").ok(),
            data_dir: std::env::var("ORC_WALLET_DATA_DIR").ok(),
        }
    }

    /// Merge with another set of overrides (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.network.is_some() {
            self.network = other.network;
        }
        if other.esplora_url.is_some() {
            self.esplora_url = other.esplora_url;
        }
        if other.backend_url.is_some() {
            self.backend_url = other.backend_url;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self
    }
}

/// Get the default configuration directory path
///
/// Returns: `~/.orc-wallet/`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".orc-wallet"))
        .ok_or(ConfigError::DirectoryNotFound)
}

/// Get the default configuration file path
///
/// Returns: `~/.orc-wallet/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.json"))
}

/// Resolve the data directory (custom or default)
pub fn data_dir(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
    match config.data_dir.as_deref() {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => default_config_dir(),
    }
}

/// Load configuration from file with overrides
///
/// # Priority (highest to lowest):
/// 1. CLI overrides (passed as argument)
/// 2. Environment variables
/// 3. Config file
/// 4. Defaults
///
/// # Example
///
/// ```ignore
/// use orc_wallet::config::{load_config, ConfigOverrides};
///
/// let config = load_config(None, ConfigOverrides::new())?;
/// ```
pub fn load_config(
    config_path: Option<&Path>,
    cli_overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)?
    } else {
        match cli_overrides.network {
            Some(NetworkType::Regtest) => GlobalConfig::default_regtest(),
            _ => GlobalConfig::default_public(),
        }
    };

    let overrides = ConfigOverrides::from_env().merge(cli_overrides);
    apply_overrides(&mut config, overrides);

    config.validate()?;
    Ok(config)
}

/// Save configuration to file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &GlobalConfig, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;

    Ok(())
}

fn apply_overrides(config: &mut GlobalConfig, overrides: ConfigOverrides) {
    if overrides.network == Some(NetworkType::Regtest)
        && overrides.esplora_url.is_none()
        && config.bitcoin.esplora_url.is_none()
    {
        config.bitcoin.esplora_url = Some("http://localhost:3002".to_string());
    }

    if let Some(network) = overrides.network {
        config.bitcoin.network = Some(network);
    }

    // Esplora URL override wins over the network default
    if let Some(url) = overrides.esplora_url {
        config.bitcoin.esplora_url = Some(url);
    }

    if let Some(url) = overrides.backend_url {
        config.backend.url = url;
    }

    if let Some(dir) = overrides.data_dir {
        config.data_dir = Some(dir);
    }
}
