//! Adapters from injected host objects to [`WalletProvider`]
//!
//! Unisat and OKX expose nearly the same object shape; what differs is
//! captured in a [`ProviderProfile`].

use super::host::{HostError, InjectedWallet};
use super::{Capabilities, ProviderError, WalletProvider};
use crate::config::NetworkType;
use crate::types::ProviderBalance;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Static description of a known injected provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Display name, also the key of the persisted connection record
    pub name: &'static str,

    /// Path of the injected object in the host environment
    pub path: &'static str,

    /// Whether the object answers `getBalance` itself
    pub direct_balance: bool,

    /// Whether the object emits `accountsChanged`
    pub account_events: bool,
}

pub const UNISAT: ProviderProfile = ProviderProfile {
    name: "Unisat",
    path: "unisat",
    direct_balance: true,
    account_events: true,
};

pub const OKX: ProviderProfile = ProviderProfile {
    name: "OKX",
    path: "okxwallet.bitcoin",
    direct_balance: false,
    account_events: false,
};

/// Provider backed by an injected host object
pub struct InjectedProvider {
    profile: ProviderProfile,
    host: Arc<dyn InjectedWallet>,
}

impl InjectedProvider {
    pub fn new(profile: ProviderProfile, host: Arc<dyn InjectedWallet>) -> Self {
        Self { profile, host }
    }

    pub fn profile(&self) -> ProviderProfile {
        self.profile
    }

    fn request_error(&self, e: HostError) -> ProviderError {
        ProviderError::Request {
            provider: self.profile.name.to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl WalletProvider for InjectedProvider {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            balance: self.profile.direct_balance,
            utxos: false,
            private_key: false,
            account_events: self.profile.account_events,
        }
    }

    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        self.host.request_accounts().await.map_err(|e| ProviderError::Request {
            provider: self.profile.name.to_string(),
            message: format!("Failed to connect to {} wallet: {}", self.profile.name, e),
        })
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        // Neither extension has a disconnect method; local state is all there is.
        Ok(())
    }

    async fn sign_message(&self, message: &str, address: &str) -> Result<String, ProviderError> {
        self.host
            .sign_message(message, address)
            .await
            .map_err(|e| self.request_error(e))
    }

    async fn sign_psbt(&self, psbt: &str) -> Result<String, ProviderError> {
        self.host
            .sign_psbt(psbt)
            .await
            .map_err(|e| self.request_error(e))
    }

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.host
            .get_accounts()
            .await
            .map_err(|e| self.request_error(e))
    }

    async fn get_network(&self) -> Result<NetworkType, ProviderError> {
        let raw = self
            .host
            .get_network()
            .await
            .map_err(|e| self.request_error(e))?;

        raw.parse().map_err(|_| ProviderError::InvalidResponse {
            provider: self.profile.name.to_string(),
            message: format!("unknown network '{}'", raw),
        })
    }

    async fn get_public_key(&self) -> Result<String, ProviderError> {
        self.host
            .get_public_key()
            .await
            .map_err(|e| self.request_error(e))
    }

    async fn get_balance(&self) -> Result<ProviderBalance, ProviderError> {
        if !self.profile.direct_balance {
            return Err(self.unsupported("getBalance"));
        }

        match self.host.get_balance().await {
            Ok(Some(balance)) => Ok(balance),
            Ok(None) => Err(self.unsupported("getBalance")),
            Err(e) => Err(self.request_error(e)),
        }
    }

    fn subscribe_account_changes(&self) -> Option<broadcast::Receiver<()>> {
        if self.profile.account_events {
            self.host.accounts_changed()
        } else {
            None
        }
    }
}
