//! Integration tests for configuration loading and overrides

use orc_wallet::bitcoin::EsploraClient;
use orc_wallet::config::{
    data_dir, load_config, save_config, ConfigError, ConfigOverrides, GlobalConfig, NetworkType,
    DEFAULT_BACKEND_URL,
};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = GlobalConfig::default();

    assert!(config.bitcoin.esplora_url.is_none());
    assert_eq!(config.bitcoin.min_utxo_value, 1000);
    assert_eq!(config.bitcoin.default_fee_rate, 10);
    assert_eq!(config.bitcoin.retry_delay(), Duration::from_millis(1000));
    assert_eq!(config.backend.url, DEFAULT_BACKEND_URL);

    let regtest = GlobalConfig::default_regtest();
    assert_eq!(
        regtest.bitcoin.esplora_url.as_deref(),
        Some("http://localhost:3002")
    );
}

#[test]
fn test_network_names() {
    assert_eq!("livenet".parse::<NetworkType>().unwrap(), NetworkType::Mainnet);
    assert_eq!("Bitcoin".parse::<NetworkType>().unwrap(), NetworkType::Mainnet);
    assert_eq!("signet".parse::<NetworkType>().unwrap(), NetworkType::Testnet);
    assert_eq!("testnet4".parse::<NetworkType>().unwrap(), NetworkType::Testnet);
    assert_eq!("regtest".parse::<NetworkType>().unwrap(), NetworkType::Regtest);
    assert!(matches!(
        "moonnet".parse::<NetworkType>(),
        Err(ConfigError::InvalidNetwork(_))
    ));

    assert_eq!(
        bitcoin::Network::from(NetworkType::Mainnet),
        bitcoin::Network::Bitcoin
    );
}

#[test]
fn test_save_and_load() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let path = temp.path().join("nested").join("config.json");

    let mut config = GlobalConfig::default_public();
    config.bitcoin.min_utxo_value = 5_000;
    config.data_dir = Some("/tmp/orc".to_string());
    save_config(&config, Some(&path)).unwrap();

    let loaded = load_config(Some(&path), ConfigOverrides::new()).unwrap();
    assert_eq!(loaded.bitcoin.min_utxo_value, 5_000);
    assert_eq!(loaded.data_dir.as_deref(), Some("/tmp/orc"));
    assert_eq!(data_dir(&loaded).unwrap(), PathBuf::from("/tmp/orc"));
}

#[test]
fn test_cli_overrides_win_over_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    save_config(&GlobalConfig::default_regtest(), Some(&path)).unwrap();

    let overrides = ConfigOverrides {
        esplora_url: Some("http://esplora.test".to_string()),
        backend_url: Some("http://backend.test/api/v1".to_string()),
        data_dir: Some(temp.path().display().to_string()),
        ..Default::default()
    };
    let config = load_config(Some(&path), overrides).unwrap();

    assert_eq!(config.bitcoin.esplora_url.as_deref(), Some("http://esplora.test"));
    assert_eq!(config.backend.url, "http://backend.test/api/v1");
    assert_eq!(data_dir(&config).unwrap(), temp.path());
}

#[test]
fn test_missing_file_uses_network_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let overrides = ConfigOverrides {
        network: Some(NetworkType::Regtest),
        ..Default::default()
    };
    let config = load_config(Some(&path), overrides).unwrap();
    assert_eq!(
        config.bitcoin.esplora_url.as_deref(),
        Some("http://localhost:3002")
    );
    assert!(!path.exists(), "loading must not create the file");
}

#[test]
fn test_network_override_selects_fee_explorer() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    save_config(&GlobalConfig::default_public(), Some(&path)).unwrap();

    let config = load_config(Some(&path), ConfigOverrides::new()).unwrap();
    assert_eq!(config.bitcoin.network(), NetworkType::Mainnet);

    let overrides = ConfigOverrides {
        network: Some(NetworkType::Testnet),
        ..Default::default()
    };
    let config = load_config(Some(&path), overrides).unwrap();
    assert_eq!(config.bitcoin.network(), NetworkType::Testnet);
    assert!(config.bitcoin.esplora_url.is_none());

    let esplora = EsploraClient::from_config(&config.bitcoin).unwrap();
    assert_eq!(
        esplora.fees_url(),
        "https://mempool.space/testnet/api/v1/fees/recommended"
    );
}

#[test]
fn test_invalid_values_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");

    let mut config = GlobalConfig::default();
    config.bitcoin.default_fee_rate = 0;
    save_config(&config, Some(&path)).unwrap();

    assert!(matches!(
        load_config(Some(&path), ConfigOverrides::new()),
        Err(ConfigError::Invalid(_))
    ));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        load_config(Some(&path), ConfigOverrides::new()),
        Err(ConfigError::Serialization(_))
    ));
}

#[test]
fn test_override_merge_precedence() {
    let env = ConfigOverrides {
        network: Some(NetworkType::Testnet),
        esplora_url: Some("http://env".to_string()),
        ..Default::default()
    };
    let cli = ConfigOverrides {
        esplora_url: Some("http://cli".to_string()),
        ..Default::default()
    };

    let merged = env.merge(cli);
    assert_eq!(merged.network, Some(NetworkType::Testnet));
    assert_eq!(merged.esplora_url.as_deref(), Some("http://cli"));
    assert!(merged.backend_url.is_none());
}
