//! Signing provider abstraction
//!
//! Every external signer (browser extension, hardware bridge, test double)
//! is reached through the [`WalletProvider`] trait. Calling code never
//! branches on provider identity, only on [`Capabilities`].

pub mod host;
pub mod injected;
pub mod registry;

use crate::config::NetworkType;
use crate::types::{ProviderBalance, Utxo};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

pub use host::{EnvironmentProbe, HostError, InjectedWallet, NoHostEnvironment, StaticEnvironment};
pub use injected::{InjectedProvider, ProviderProfile, OKX, UNISAT};
pub use registry::{ProviderRegistry, ProviderSpec};

/// Errors raised by provider adapters
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} wallet not found")]
    NotInstalled { provider: String },

    #[error("{provider} does not support {capability}")]
    Unsupported {
        provider: String,
        capability: &'static str,
    },

    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },
}

/// Optional capabilities a provider may expose
///
/// Connect, disconnect, message/PSBT signing, account listing, network and
/// public key queries are mandatory and always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub balance: bool,
    pub utxos: bool,
    pub private_key: bool,
    pub account_events: bool,
}

/// Provider capability interface
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Request account access; returns the authorized addresses
    async fn connect(&self) -> Result<Vec<String>, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    async fn sign_message(&self, message: &str, address: &str) -> Result<String, ProviderError>;

    async fn sign_psbt(&self, psbt: &str) -> Result<String, ProviderError>;

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn get_network(&self) -> Result<NetworkType, ProviderError>;

    async fn get_public_key(&self) -> Result<String, ProviderError>;

    async fn get_balance(&self) -> Result<ProviderBalance, ProviderError> {
        Err(self.unsupported("getBalance"))
    }

    async fn get_utxos(&self, _address: &str) -> Result<Vec<Utxo>, ProviderError> {
        Err(self.unsupported("getUtxos"))
    }

    async fn get_private_key(&self) -> Result<String, ProviderError> {
        Err(self.unsupported("getPrivateKey"))
    }

    /// Subscribe to account-change notifications. Dropping the receiver
    /// unsubscribes.
    fn subscribe_account_changes(&self) -> Option<broadcast::Receiver<()>> {
        None
    }

    fn unsupported(&self, capability: &'static str) -> ProviderError {
        ProviderError::Unsupported {
            provider: self.name().to_string(),
            capability,
        }
    }
}

/// Uniform handle to a detected provider
///
/// One per detected provider per session; immutable once constructed.
#[derive(Clone)]
pub struct WalletProviderDescriptor {
    name: String,
    capabilities: Capabilities,
    provider: Arc<dyn WalletProvider>,
}

impl WalletProviderDescriptor {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            name: provider.name().to_string(),
            capabilities: provider.capabilities(),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }

    pub fn handle(&self) -> Arc<dyn WalletProvider> {
        Arc::clone(&self.provider)
    }
}

impl std::fmt::Debug for WalletProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletProviderDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
