//! Connection state machine
//!
//! Drives connect, disconnect, balance refresh, silent reconnection on
//! startup and the reaction to provider account changes. All mutation goes
//! through `&mut self`, so a connect and a disconnect can never overlap.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::bitcoin::BalanceSource;
use crate::config::NetworkType;
use crate::connection::state::{transition, ConnectionSnapshot, ConnectionState, Event};
use crate::connection::ConnectionError;
use crate::provider::{ProviderRegistry, WalletProviderDescriptor};
use crate::storage::{ConnectionStore, PersistedConnection, PrivateKeyVault};

/// Result of [`ConnectionStateMachine::auto_reconnect`]
#[derive(Debug)]
pub enum ReconnectOutcome {
    /// Nothing was persisted
    NoRecord,
    /// The saved provider is not installed; the record is kept
    ProviderNotFound(String),
    /// The saved address is no longer authorized; the record was erased
    AccountUnavailable,
    /// Connected again
    Reconnected,
    /// Connect failed; the record was erased
    Failed(ConnectionError),
}

impl ReconnectOutcome {
    pub fn is_reconnected(&self) -> bool {
        matches!(self, ReconnectOutcome::Reconnected)
    }
}

struct Session {
    address: String,
    public_key: String,
    network: NetworkType,
}

pub struct ConnectionStateMachine {
    registry: ProviderRegistry,
    store: Arc<dyn ConnectionStore>,
    vault: PrivateKeyVault,
    balance_source: Option<Arc<dyn BalanceSource>>,
    state: ConnectionState,
    account_events: Option<broadcast::Receiver<()>>,
}

impl ConnectionStateMachine {
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<dyn ConnectionStore>,
        vault: PrivateKeyVault,
    ) -> Self {
        Self {
            registry,
            store,
            vault,
            balance_source: None,
            state: ConnectionState::default(),
            account_events: None,
        }
    }

    /// Network balance lookup for providers without a balance capability
    pub fn with_balance_source(mut self, source: Arc<dyn BalanceSource>) -> Self {
        self.balance_source = Some(source);
        self
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.state.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn vault(&self) -> &PrivateKeyVault {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut PrivateKeyVault {
        &mut self.vault
    }

    pub fn has_account_subscription(&self) -> bool {
        self.account_events.is_some()
    }

    pub fn available_providers(&self) -> Vec<WalletProviderDescriptor> {
        self.registry.detect()
    }

    /// Connect to `descriptor`
    ///
    /// On failure the state is back to disconnected with the error recorded;
    /// any previously persisted record is left alone.
    pub async fn connect(
        &mut self,
        descriptor: WalletProviderDescriptor,
    ) -> Result<(), ConnectionError> {
        self.state.phase = transition(self.state.phase, Event::Connect)?;
        self.account_events = None;
        self.state.loading = true;
        self.state.last_error = None;

        log::info!("Connecting to {} wallet", descriptor.name());

        let session = match Self::establish(&descriptor).await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Connection to {} failed: {}", descriptor.name(), e);
                transition(self.state.phase, Event::Failed)?;
                self.state.reset();
                self.state.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.state.phase = transition(self.state.phase, Event::Established)?;
        self.state.address = Some(session.address.clone());
        self.state.public_key = Some(session.public_key);
        self.state.network = Some(session.network);
        self.state.balance = 0;
        self.state.loading = false;

        let record = PersistedConnection::new(descriptor.name(), &session.address);
        if let Err(e) = self.store.save(&record) {
            log::warn!("Could not persist connection record: {}", e);
        }

        if descriptor.capabilities().account_events {
            self.account_events = descriptor.provider().subscribe_account_changes();
        }

        log::info!(
            "✓ Connected to {} ({}, {})",
            descriptor.name(),
            session.address,
            session.network
        );
        self.state.provider = Some(descriptor);

        self.refresh_balance().await;
        Ok(())
    }

    /// Detect providers and connect to the one called `name`
    pub async fn connect_by_name(&mut self, name: &str) -> Result<(), ConnectionError> {
        let descriptor = self
            .registry
            .find(name)
            .ok_or_else(|| ConnectionError::ProviderNotFound(name.to_string()))?;
        self.connect(descriptor).await
    }

    async fn establish(descriptor: &WalletProviderDescriptor) -> Result<Session, ConnectionError> {
        let provider = descriptor.provider();

        let accounts = provider.connect().await?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or(ConnectionError::NoAccounts)?;
        let public_key = provider.get_public_key().await?;
        let network = provider.get_network().await?;

        Ok(Session {
            address,
            public_key,
            network,
        })
    }

    /// Tear the connection down. Never fails locally.
    pub async fn disconnect(&mut self) {
        if let Some(descriptor) = self.state.provider.take() {
            if let Err(e) = descriptor.provider().disconnect().await {
                log::warn!("{} disconnect failed: {}", descriptor.name(), e);
            }
            log::info!("Disconnected from {}", descriptor.name());
        }

        if let Err(e) = self.store.clear() {
            log::warn!("Could not erase connection record: {}", e);
        }

        self.account_events = None;
        self.vault.clear();
        self.state.reset();
    }

    /// Refresh the balance of the connected address and return it
    ///
    /// Failures leave the previous balance in place.
    pub async fn refresh_balance(&mut self) -> u64 {
        let (Some(descriptor), Some(address)) =
            (self.state.provider.as_ref(), self.state.address.as_deref())
        else {
            return self.state.balance;
        };

        let fetched = if descriptor.capabilities().balance {
            descriptor
                .provider()
                .get_balance()
                .await
                .map(|b| b.total)
                .map_err(|e| e.to_string())
        } else if let Some(source) = &self.balance_source {
            source
                .address_balance(address)
                .await
                .map(|b| b.total)
                .map_err(|e| e.to_string())
        } else {
            log::debug!("{} has no balance capability", descriptor.name());
            return self.state.balance;
        };

        match fetched {
            Ok(total) => {
                log::debug!("Balance for {}: {} sats", address, total);
                self.state.balance = total;
            }
            Err(e) => log::warn!("Balance refresh for {} failed: {}", address, e),
        }
        self.state.balance
    }

    /// Silently restore the persisted connection, if it is still valid
    pub async fn auto_reconnect(&mut self) -> ReconnectOutcome {
        let record = match self.store.load() {
            Ok(Some(record)) => record,
            Ok(None) => return ReconnectOutcome::NoRecord,
            Err(e) => {
                log::warn!("Could not read connection record: {}", e);
                return ReconnectOutcome::NoRecord;
            }
        };

        let Some(descriptor) = self.registry.find(&record.wallet_name) else {
            log::info!(
                "Saved provider {} is not available; skipping reconnect",
                record.wallet_name
            );
            return ReconnectOutcome::ProviderNotFound(record.wallet_name);
        };

        match descriptor.provider().get_accounts().await {
            Ok(accounts) if accounts.iter().any(|a| a == &record.address) => {}
            Ok(_) => {
                log::info!(
                    "{} is no longer authorized in {}; forgetting it",
                    record.address,
                    record.wallet_name
                );
                self.forget_record();
                return ReconnectOutcome::AccountUnavailable;
            }
            Err(e) => {
                log::warn!("Could not list {} accounts: {}", record.wallet_name, e);
                self.forget_record();
                return ReconnectOutcome::AccountUnavailable;
            }
        }

        match self.connect(descriptor).await {
            Ok(()) => ReconnectOutcome::Reconnected,
            Err(e) => {
                self.forget_record();
                ReconnectOutcome::Failed(e)
            }
        }
    }

    fn forget_record(&self) {
        if let Err(e) = self.store.clear() {
            log::warn!("Could not erase connection record: {}", e);
        }
    }

    /// React to a provider account change
    ///
    /// Returns `true` if the connection was torn down.
    pub async fn handle_accounts_changed(&mut self) -> bool {
        let (Some(descriptor), Some(address)) =
            (self.state.provider.clone(), self.state.address.clone())
        else {
            return false;
        };

        match descriptor.provider().get_accounts().await {
            Ok(accounts) if accounts.iter().any(|a| a == &address) => false,
            Ok(accounts) => {
                if accounts.is_empty() {
                    log::info!("{} revoked all accounts", descriptor.name());
                } else {
                    log::info!("{} no longer offers {}", descriptor.name(), address);
                }
                self.disconnect().await;
                true
            }
            Err(e) => {
                log::warn!("Account query after change failed: {}", e);
                self.disconnect().await;
                true
            }
        }
    }

    /// Drain pending account-change notifications without waiting
    ///
    /// Returns `true` if the connection was torn down.
    pub async fn process_account_events(&mut self) -> bool {
        let mut changed = false;

        while let Some(events) = self.account_events.as_mut() {
            match events.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    self.account_events = None;
                }
            }
        }

        if changed {
            self.handle_accounts_changed().await
        } else {
            false
        }
    }

    /// Wait for the next account-change notification and react to it
    ///
    /// Returns `None` when there is no live subscription.
    pub async fn next_account_event(&mut self) -> Option<bool> {
        let events = self.account_events.as_mut()?;
        match events.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => Some(self.handle_accounts_changed().await),
            Err(RecvError::Closed) => {
                self.account_events = None;
                None
            }
        }
    }
}

impl std::fmt::Debug for ConnectionStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStateMachine")
            .field("state", &self.state)
            .field("vault", &self.vault)
            .field("subscribed", &self.account_events.is_some())
            .finish()
    }
}
