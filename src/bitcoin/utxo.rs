//! Spendable output selection
//!
//! Fetches UTXOs for an address and picks the first one that is large
//! enough. Outputs spent by our own broadcasts are remembered locally until
//! the explorer stops reporting them.

use crate::bitcoin::network::{EsploraClient, NetworkError, OutspendStatus};
use crate::provider::WalletProvider;
use crate::types::{Outpoint, Utxo};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Default minimum value (sats) for a selectable UTXO
pub const DEFAULT_MIN_UTXO_VALUE: u64 = 1000;

/// External UTXO data
#[async_trait]
pub trait UtxoSource: Send + Sync {
    async fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>, NetworkError>;

    async fn outspend(&self, address: &str, outpoint: &Outpoint)
        -> Result<OutspendStatus, NetworkError>;
}

#[async_trait]
impl UtxoSource for EsploraClient {
    async fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>, NetworkError> {
        self.get_address_utxos(address).await
    }

    async fn outspend(
        &self,
        address: &str,
        outpoint: &Outpoint,
    ) -> Result<OutspendStatus, NetworkError> {
        self.get_outspend(address, outpoint).await
    }
}

/// Spend state of a candidate input, checked right before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStatus {
    Unspent,
    Spent { by: Option<String> },
    Unknown,
}

/// First-fit selection: the first UTXO, in the given order, whose value is
/// at least `min_value`
pub fn select_first_fit(utxos: &[Utxo], min_value: u64) -> Option<&Utxo> {
    utxos.iter().find(|u| u.value >= min_value)
}

/// Fetches and selects spendable outputs
pub struct UtxoSelector {
    source: Arc<dyn UtxoSource>,
    retry_delay: Duration,
    min_value: u64,

    /// Outpoints spent by our own broadcasts, per funding address
    consumed: HashMap<String, HashSet<Outpoint>>,
}

impl UtxoSelector {
    pub fn new(source: Arc<dyn UtxoSource>, retry_delay: Duration) -> Self {
        Self {
            source,
            retry_delay,
            min_value: DEFAULT_MIN_UTXO_VALUE,
            consumed: HashMap::new(),
        }
    }

    pub fn with_min_value(mut self, min_value: u64) -> Self {
        self.min_value = min_value;
        self
    }

    pub fn min_value(&self) -> u64 {
        self.min_value
    }

    /// Fetch spendable outputs, retrying once after the fixed delay
    ///
    /// An error means "no spendable outputs known"; callers must surface it
    /// and block submission.
    pub async fn fetch_spendable(&mut self, address: &str) -> Result<Vec<Utxo>, NetworkError> {
        let utxos = match self.source.list_utxos(address).await {
            Ok(utxos) => utxos,
            Err(first) => {
                log::warn!(
                    "UTXO fetch for {} failed ({}), retrying in {:?}",
                    address,
                    first,
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;

                self.source.list_utxos(address).await.map_err(|e| {
                    log::error!("UTXO fetch retry for {} also failed: {}", address, e);
                    e
                })?
            }
        };

        self.forget_indexed(address, &utxos);
        Ok(utxos)
    }

    /// Fetch through the provider when it can list UTXOs itself, otherwise
    /// through the network source
    pub async fn fetch_spendable_via(
        &mut self,
        provider: Option<&dyn WalletProvider>,
        address: &str,
    ) -> Result<Vec<Utxo>, NetworkError> {
        if let Some(provider) = provider.filter(|p| p.capabilities().utxos) {
            match provider.get_utxos(address).await {
                Ok(utxos) => {
                    self.forget_indexed(address, &utxos);
                    return Ok(utxos);
                }
                Err(e) => {
                    log::warn!(
                        "{} could not list UTXOs ({}), falling back to explorer",
                        provider.name(),
                        e
                    );
                }
            }
        }

        self.fetch_spendable(address).await
    }

    /// First viable UTXO not already consumed by one of our broadcasts
    pub fn select_one(&self, utxos: &[Utxo], min_value: u64) -> Option<Utxo> {
        utxos
            .iter()
            .filter(|u| !self.is_consumed_anywhere(&u.outpoint()))
            .find(|u| u.value >= min_value)
            .cloned()
    }

    /// `select_one` with the configured minimum
    pub fn select_default(&self, utxos: &[Utxo]) -> Option<Utxo> {
        self.select_one(utxos, self.min_value)
    }

    /// Exclude an outpoint of `address` from selection until the explorer
    /// stops listing it for that address
    pub fn mark_consumed(&mut self, address: &str, outpoint: Outpoint) {
        log::debug!("Marking {} of {} as consumed", outpoint, address);
        self.consumed
            .entry(address.trim().to_string())
            .or_default()
            .insert(outpoint);
    }

    pub fn is_consumed(&self, address: &str, outpoint: &Outpoint) -> bool {
        self.consumed
            .get(address.trim())
            .is_some_and(|set| set.contains(outpoint))
    }

    /// Consumed outpoints across all addresses
    pub fn consumed_count(&self) -> usize {
        self.consumed.values().map(HashSet::len).sum()
    }

    fn is_consumed_anywhere(&self, outpoint: &Outpoint) -> bool {
        self.consumed.values().any(|set| set.contains(outpoint))
    }

    /// Ask the explorer whether `utxo` is still unspent
    pub async fn check_unspent(&self, address: &str, utxo: &Utxo) -> Result<InputStatus, NetworkError> {
        match self.source.outspend(address, &utxo.outpoint()).await {
            Ok(status) if status.spent => Ok(InputStatus::Spent {
                by: status.spending_txid,
            }),
            Ok(_) => Ok(InputStatus::Unspent),
            Err(NetworkError::NotFound(_)) => Ok(InputStatus::Unknown),
            Err(e) => Err(e),
        }
    }

    // A consumed outpoint missing from a fresh listing of its own address has
    // been indexed as spent. Other addresses are left alone.
    fn forget_indexed(&mut self, address: &str, fresh: &[Utxo]) {
        let address = address.trim();
        let Some(consumed) = self.consumed.get_mut(address) else {
            return;
        };
        let listed: HashSet<Outpoint> = fresh.iter().map(Utxo::outpoint).collect();
        consumed.retain(|o| listed.contains(o));
        if consumed.is_empty() {
            self.consumed.remove(address);
        }
    }
}

impl std::fmt::Debug for UtxoSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtxoSelector")
            .field("retry_delay", &self.retry_delay)
            .field("min_value", &self.min_value)
            .field("consumed", &self.consumed_count())
            .finish()
    }
}
