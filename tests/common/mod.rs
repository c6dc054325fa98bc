//! Common test utilities for orc-wallet integration tests
//!
//! Provides an in-process host wallet object, scripted UTXO and fee sources,
//! and helpers for building a connection state machine against them.

#![allow(dead_code)]

pub mod server;

use async_trait::async_trait;
use orc_wallet::bitcoin::{FeeSource, NetworkError, OutspendStatus, RecommendedFees, UtxoSource};
use orc_wallet::connection::ConnectionStateMachine;
use orc_wallet::config::NetworkType;
use orc_wallet::provider::{
    Capabilities, EnvironmentProbe, HostError, InjectedWallet, ProviderError, ProviderRegistry,
    StaticEnvironment, WalletProvider,
};
use orc_wallet::storage::{
    ConnectionStore, MemoryConnectionStore, MemorySessionStore, PrivateKeyVault, SessionStore,
};
use orc_wallet::types::{Outpoint, ProviderBalance, Utxo};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// BIP173 mainnet test vector
pub const MAINNET_ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

/// BIP173 testnet test vector
pub const TESTNET_ADDRESS: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";

/// Second mainnet address (P2PKH) for account switching
pub const OTHER_ADDRESS: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";

pub const PUBLIC_KEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

/// Valid mainnet WIF (uncompressed)
pub const MAINNET_WIF: &str = "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ";

pub fn txid(fill: char) -> String {
    std::iter::repeat(fill).take(64).collect()
}

/// Mutable behaviour of a [`MockHost`]
#[derive(Debug, Clone)]
pub struct MockHostState {
    pub accounts: Vec<String>,
    pub network: String,
    pub public_key: String,
    pub balance: Option<ProviderBalance>,
    pub fail_connect: bool,
    pub fail_accounts: bool,
    pub reject_signing: bool,
    pub signed_messages: Vec<String>,
    pub signed_psbts: Vec<String>,
}

/// In-process stand-in for an injected wallet object
pub struct MockHost {
    state: Mutex<MockHostState>,
    events: broadcast::Sender<()>,
}

impl MockHost {
    pub fn new(accounts: &[&str]) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(MockHostState {
                accounts: accounts.iter().map(|a| a.to_string()).collect(),
                network: "livenet".to_string(),
                public_key: PUBLIC_KEY.to_string(),
                balance: Some(ProviderBalance::new(50_000, 2_000)),
                fail_connect: false,
                fail_accounts: false,
                reject_signing: false,
                signed_messages: Vec::new(),
                signed_psbts: Vec::new(),
            }),
            events,
        })
    }

    pub fn update(&self, f: impl FnOnce(&mut MockHostState)) {
        let mut state = self.state.lock().unwrap();
        f(&mut *state);
    }

    pub fn state(&self) -> MockHostState {
        self.state.lock().unwrap().clone()
    }

    /// Emit `accountsChanged`
    pub fn fire_accounts_changed(&self) {
        let _ = self.events.send(());
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl InjectedWallet for MockHost {
    async fn request_accounts(&self) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        if state.fail_connect {
            return Err(HostError::new("User rejected the request"));
        }
        Ok(state.accounts.clone())
    }

    async fn get_accounts(&self) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        if state.fail_accounts {
            return Err(HostError::new("accounts unavailable"));
        }
        Ok(state.accounts.clone())
    }

    async fn get_network(&self) -> Result<String, HostError> {
        Ok(self.state.lock().unwrap().network.clone())
    }

    async fn get_public_key(&self) -> Result<String, HostError> {
        Ok(self.state.lock().unwrap().public_key.clone())
    }

    async fn sign_message(&self, message: &str, _address: &str) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_signing {
            return Err(HostError::new("User rejected the request"));
        }
        state.signed_messages.push(message.to_string());
        Ok(format!("sig:{}", message.len()))
    }

    async fn sign_psbt(&self, psbt: &str) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_signing {
            return Err(HostError::new("User rejected the request"));
        }
        state.signed_psbts.push(psbt.to_string());
        Ok(format!("signed:{}", psbt))
    }

    async fn get_balance(&self) -> Result<Option<ProviderBalance>, HostError> {
        Ok(self.state.lock().unwrap().balance)
    }

    fn accounts_changed(&self) -> Option<broadcast::Receiver<()>> {
        Some(self.events.subscribe())
    }
}

/// Environment exposing `host` under the Unisat path
pub fn unisat_env(host: Arc<MockHost>) -> Arc<dyn EnvironmentProbe> {
    Arc::new(StaticEnvironment::new().with("unisat", host as Arc<dyn InjectedWallet>))
}

/// Environment exposing `host` under the OKX path
pub fn okx_env(host: Arc<MockHost>) -> Arc<dyn EnvironmentProbe> {
    Arc::new(StaticEnvironment::new().with("okxwallet.bitcoin", host as Arc<dyn InjectedWallet>))
}

/// State machine over in-memory stores
pub struct MachineHarness {
    pub machine: ConnectionStateMachine,
    pub store: Arc<MemoryConnectionStore>,
    pub session: Arc<MemorySessionStore>,
}

impl MachineHarness {
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self::with_store(probe, Arc::new(MemoryConnectionStore::new()))
    }

    pub fn with_store(probe: Arc<dyn EnvironmentProbe>, store: Arc<MemoryConnectionStore>) -> Self {
        let session = Arc::new(MemorySessionStore::new());
        let vault = PrivateKeyVault::new(session.clone() as Arc<dyn SessionStore>);
        let machine = ConnectionStateMachine::new(
            ProviderRegistry::new(probe),
            store.clone() as Arc<dyn ConnectionStore>,
            vault,
        );
        Self {
            machine,
            store,
            session,
        }
    }
}

fn unavailable(url: &str) -> NetworkError {
    NetworkError::Status {
        url: url.to_string(),
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

/// Scripted UTXO source
#[derive(Default)]
pub struct MockUtxoSource {
    utxos: Mutex<Vec<Utxo>>,
    by_address: Mutex<HashMap<String, Vec<Utxo>>>,
    failures_remaining: AtomicUsize,
    calls: AtomicUsize,
    outspends: Mutex<HashMap<Outpoint, OutspendStatus>>,
}

impl MockUtxoSource {
    pub fn new(utxos: Vec<Utxo>) -> Arc<Self> {
        Arc::new(Self {
            utxos: Mutex::new(utxos),
            ..Default::default()
        })
    }

    /// Fail the next `n` listings
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    pub fn set_utxos(&self, utxos: Vec<Utxo>) {
        *self.utxos.lock().unwrap() = utxos;
    }

    /// Listing for one address; others get the shared listing
    pub fn set_utxos_for(&self, address: &str, utxos: Vec<Utxo>) {
        self.by_address
            .lock()
            .unwrap()
            .insert(address.to_string(), utxos);
    }

    pub fn set_outspend(&self, outpoint: Outpoint, status: OutspendStatus) {
        self.outspends.lock().unwrap().insert(outpoint, status);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UtxoSource for MockUtxoSource {
    async fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(unavailable("mock explorer"));
        }
        if let Some(utxos) = self.by_address.lock().unwrap().get(address) {
            return Ok(utxos.clone());
        }
        Ok(self.utxos.lock().unwrap().clone())
    }

    async fn outspend(
        &self,
        _address: &str,
        outpoint: &Outpoint,
    ) -> Result<OutspendStatus, NetworkError> {
        self.outspends
            .lock()
            .unwrap()
            .get(outpoint)
            .cloned()
            .ok_or_else(|| NetworkError::NotFound(outpoint.to_string()))
    }
}

/// Fee source answering with fixed tiers, or failing
pub struct MockFeeSource {
    pub fees: Option<RecommendedFees>,
}

impl MockFeeSource {
    pub fn hour(rate: f64) -> Arc<Self> {
        Arc::new(Self {
            fees: Some(RecommendedFees {
                hour_fee: Some(rate),
                ..Default::default()
            }),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fees: None })
    }
}

#[async_trait]
impl FeeSource for MockFeeSource {
    async fn recommended_fees(&self) -> Result<RecommendedFees, NetworkError> {
        self.fees
            .ok_or_else(|| unavailable("mock fee service"))
    }
}

/// Provider that lists UTXOs itself; `None` makes the listing fail
pub struct UtxoListingProvider {
    utxos: Mutex<Option<Vec<Utxo>>>,
    calls: AtomicUsize,
}

impl UtxoListingProvider {
    pub fn new(utxos: Option<Vec<Utxo>>) -> Self {
        Self {
            utxos: Mutex::new(utxos),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for UtxoListingProvider {
    fn name(&self) -> &str {
        "Listing"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            utxos: true,
            ..Default::default()
        }
    }

    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![MAINNET_ADDRESS.to_string()])
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn sign_message(&self, message: &str, _address: &str) -> Result<String, ProviderError> {
        Ok(format!("sig:{}", message.len()))
    }

    async fn sign_psbt(&self, psbt: &str) -> Result<String, ProviderError> {
        Ok(format!("signed:{}", psbt))
    }

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![MAINNET_ADDRESS.to_string()])
    }

    async fn get_network(&self) -> Result<NetworkType, ProviderError> {
        Ok(NetworkType::Mainnet)
    }

    async fn get_public_key(&self) -> Result<String, ProviderError> {
        Ok(PUBLIC_KEY.to_string())
    }

    async fn get_utxos(&self, _address: &str) -> Result<Vec<Utxo>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.utxos
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::Request {
                provider: self.name().to_string(),
                message: "indexer offline".to_string(),
            })
    }
}
