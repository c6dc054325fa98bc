//! Config command implementations

use std::path::Path;

use crate::config::{ConfigError, GlobalConfig, NetworkType};

/// Initialize configuration file with network-specific defaults
pub fn init(network: Option<String>, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let network_type = match network.as_deref() {
        Some(n) => n.parse()?,
        None => NetworkType::Mainnet,
    };

    // Public networks follow the address prefix; regtest needs a pinned Esplora.
    let mut config = match network_type {
        NetworkType::Regtest => GlobalConfig::default_regtest(),
        NetworkType::Mainnet | NetworkType::Testnet => GlobalConfig::default_public(),
    };
    config.bitcoin.network = Some(network_type);

    crate::config::save_config(&config, config_path)?;

    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => crate::config::default_config_path()?,
    };
    println!("✓ Configuration initialized for {}", network_type);
    println!("  Config file: {}", path.display());
    if let Some(url) = &config.bitcoin.esplora_url {
        println!("  Esplora:     {}", url);
    }
    println!("  Backend:     {}", config.backend.url);

    Ok(())
}
