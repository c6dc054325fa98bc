//! CLI command implementations

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod fee;
pub mod key;
pub mod provider;
pub mod utxo;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_config, ConfigOverrides, GlobalConfig};
use crate::manager::{ManagerError, WalletManager};
use crate::provider::NoHostEnvironment;

/// Arguments shared by every command that loads the config
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

impl Context {
    pub fn load_config(&self) -> Result<GlobalConfig, ManagerError> {
        Ok(load_config(
            self.config_path.as_deref(),
            self.overrides.clone(),
        )?)
    }

    /// A manager for a non-interactive session: no host wallets are injected
    pub fn manager(&self) -> Result<WalletManager, ManagerError> {
        WalletManager::new(self.load_config()?, Arc::new(NoHostEnvironment))
    }
}
