//! Wallet manager - Main integration layer
//!
//! Coordinates the connection, UTXO selection, fee estimation, signing and
//! broadcast layers for one session.

use std::sync::Arc;

use crate::bitcoin::{
    BroadcastClient, Broadcaster, EsploraClient, FeeEstimator, InputStatus, NetworkError,
    UtxoSelector,
};
use crate::config::{self, ConfigError, GlobalConfig};
use crate::connection::{
    ConnectionError, ConnectionSnapshot, ConnectionStateMachine, ReconnectOutcome,
};
use crate::error::{validate_address, ValidationError};
use crate::provider::{EnvironmentProbe, ProviderRegistry, WalletProviderDescriptor};
use crate::signing::{SignedRequest, SigningCoordinator, SigningError, SigningRequest};
use crate::storage::{
    FileConnectionStore, MemorySessionStore, PrivateKeyVault, StorageError,
};
use crate::types::{BroadcastReceipt, Outpoint, SignedArtifact, Utxo};

/// Errors that can occur in the wallet manager
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
}

/// Everything needed to fund a transaction from one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPlan {
    pub address: String,

    /// Full fetched list, in source order
    pub utxos: Vec<Utxo>,

    /// First viable, unconsumed output (None if nothing qualifies)
    pub selected: Option<Utxo>,

    /// Fee rate in sat/vB
    pub fee_rate: u64,
}

/// Main wallet manager
///
/// Owns every stateful component of a session; nothing here is global.
pub struct WalletManager {
    config: GlobalConfig,
    connection: ConnectionStateMachine,
    selector: UtxoSelector,
    fees: FeeEstimator,
    signer: SigningCoordinator,
    broadcaster: Arc<dyn Broadcaster>,
}

impl WalletManager {
    /// Create a manager wired to the configured Esplora and backend
    ///
    /// The connection record lives in the configured data directory; the
    /// key vault mirror lives in process memory.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use orc_wallet::config::GlobalConfig;
    /// use orc_wallet::manager::WalletManager;
    /// use orc_wallet::provider::NoHostEnvironment;
    ///
    /// let manager = WalletManager::new(GlobalConfig::default(), Arc::new(NoHostEnvironment))?;
    /// ```
    pub fn new(
        config: GlobalConfig,
        probe: Arc<dyn EnvironmentProbe>,
    ) -> Result<Self, ManagerError> {
        config.validate()?;

        let esplora = EsploraClient::from_config(&config.bitcoin)?;
        let store = FileConnectionStore::in_dir(&config::data_dir(&config)?);
        let vault = PrivateKeyVault::new(Arc::new(MemorySessionStore::new()));

        let connection =
            ConnectionStateMachine::new(ProviderRegistry::new(probe), Arc::new(store), vault)
                .with_balance_source(Arc::new(esplora.clone()));
        let selector = UtxoSelector::new(Arc::new(esplora.clone()), config.bitcoin.retry_delay())
            .with_min_value(config.bitcoin.min_utxo_value);
        let fees = FeeEstimator::new(Arc::new(esplora.clone()))
            .with_default_rate(config.bitcoin.default_fee_rate);
        let broadcaster = BroadcastClient::new(
            &config.backend.url,
            esplora,
            config.bitcoin.request_timeout(),
        )?;

        Ok(Self::with_parts(
            config,
            connection,
            selector,
            fees,
            Arc::new(broadcaster),
        ))
    }

    /// Assemble a manager from already built components
    pub fn with_parts(
        config: GlobalConfig,
        connection: ConnectionStateMachine,
        selector: UtxoSelector,
        fees: FeeEstimator,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            config,
            connection,
            selector,
            fees,
            signer: SigningCoordinator::new(),
            broadcaster,
        }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionStateMachine {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionStateMachine {
        &mut self.connection
    }

    pub fn selector(&self) -> &UtxoSelector {
        &self.selector
    }

    pub fn fees(&self) -> &FeeEstimator {
        &self.fees
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.connection.snapshot()
    }

    /// Session startup: silently restore the last connection
    pub async fn start(&mut self) -> ReconnectOutcome {
        let outcome = self.connection.auto_reconnect().await;
        log::debug!("Startup reconnect: {:?}", outcome);
        outcome
    }

    pub fn available_providers(&self) -> Vec<WalletProviderDescriptor> {
        self.connection.available_providers()
    }

    pub async fn connect(&mut self, provider_name: &str) -> Result<ConnectionSnapshot, ManagerError> {
        self.connection.connect_by_name(provider_name).await?;
        Ok(self.connection.snapshot())
    }

    pub async fn disconnect(&mut self) {
        self.connection.disconnect().await;
    }

    pub async fn refresh_balance(&mut self) -> u64 {
        self.connection.refresh_balance().await
    }

    /// Store a manually entered key for this session
    pub fn set_private_key(&mut self, key: &str) -> Result<(), ManagerError> {
        self.connection.vault_mut().set(key)?;
        Ok(())
    }

    /// Fetch UTXOs, pick a funding input and estimate the fee
    ///
    /// `address` defaults to the connected address. A UTXO fetch failure is
    /// an error; a fee service failure is not.
    pub async fn prepare_funding(
        &mut self,
        address: Option<&str>,
    ) -> Result<FundingPlan, ManagerError> {
        let address = match address {
            Some(a) => a.trim().to_string(),
            None => self
                .connection
                .state()
                .address()
                .ok_or(ConnectionError::NotConnected)?
                .to_string(),
        };
        validate_address(&address)?;

        let provider = self
            .connection
            .state()
            .provider()
            .map(WalletProviderDescriptor::provider);
        let utxos = self.selector.fetch_spendable_via(provider, &address).await?;
        let selected = self.selector.select_default(&utxos);

        match &selected {
            Some(utxo) => log::info!(
                "Selected {} ({} sats) from {} UTXOs",
                utxo.outpoint(),
                utxo.value,
                utxos.len()
            ),
            None => log::warn!(
                "No UTXO of at least {} sats among {} for {}",
                self.selector.min_value(),
                utxos.len(),
                address
            ),
        }

        let fee_rate = self.fees.estimate().await;

        Ok(FundingPlan {
            address,
            utxos,
            selected,
            fee_rate,
        })
    }

    /// Check that a planned input is still unspent right before submission
    pub async fn verify_input(&self, address: &str, utxo: &Utxo) -> Result<InputStatus, ManagerError> {
        Ok(self.selector.check_unspent(address, utxo).await?)
    }

    /// Build and sign the canonical message for an ORC operation
    pub async fn sign_request(
        &self,
        request: &SigningRequest,
    ) -> Result<SignedRequest, ManagerError> {
        Ok(self.signer.sign_request(&self.connection, request).await?)
    }

    /// Sign `psbt` with the connected provider and broadcast it
    ///
    /// On success `inputs` are excluded from future selection for the
    /// connected address. On broadcast failure the signed PSBT is dropped;
    /// the caller retries from signing.
    pub async fn submit_psbt(
        &mut self,
        psbt: &str,
        inputs: &[Outpoint],
    ) -> Result<BroadcastReceipt, ManagerError> {
        let artifact = self.signer.sign_psbt(&self.connection, psbt).await?;
        let address = self
            .connection
            .state()
            .address()
            .ok_or(ConnectionError::NotConnected)?
            .to_string();

        match self.broadcaster.broadcast(&artifact).await {
            Ok(receipt) => {
                for outpoint in inputs {
                    self.selector.mark_consumed(&address, outpoint.clone());
                }
                Ok(receipt)
            }
            Err(e) => {
                log::warn!("Broadcast failed, discarding signed PSBT: {}", e);
                Err(e.into())
            }
        }
    }

    /// Hand an already signed artifact to the broadcast collaborator
    pub async fn broadcast(&self, artifact: &SignedArtifact) -> Result<BroadcastReceipt, ManagerError> {
        Ok(self.broadcaster.broadcast(artifact).await?)
    }
}
