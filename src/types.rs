//! Shared types for orc-wallet
//!
//! Chain data structures used across the provider, selection and signing
//! layers.

use serde::{Deserialize, Serialize};

/// A spendable output as reported by a provider or the explorer
///
/// Immutable snapshot of chain state at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID (hex)
    pub txid: String,

    /// Output index
    pub vout: u32,

    /// Amount in satoshis
    pub value: u64,

    /// Locking script (hex), when the source provides it
    #[serde(default, rename = "scriptPubKey", skip_serializing_if = "Option::is_none")]
    pub script_pubkey: Option<String>,

    /// Confirmation flag from the explorer (None when unknown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

impl Utxo {
    pub fn new(txid: impl Into<String>, vout: u32, value: u64) -> Self {
        Self {
            txid: txid.into(),
            vout,
            value,
            script_pubkey: None,
            confirmed: None,
        }
    }

    pub fn outpoint(&self) -> Outpoint {
        Outpoint {
            txid: self.txid.clone(),
            vout: self.vout,
        }
    }
}

/// UTXO identity in format "txid:vout"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Outpoint {
    pub txid: String,
    pub vout: u32,
}

impl Outpoint {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }
}

impl std::fmt::Display for Outpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl std::str::FromStr for Outpoint {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s
            .rsplit_once(':')
            .ok_or_else(|| crate::error::ValidationError::InvalidOutpoint(s.to_string()))?;
        let vout = vout
            .parse()
            .map_err(|_| crate::error::ValidationError::InvalidOutpoint(s.to_string()))?;
        if txid.is_empty() {
            return Err(crate::error::ValidationError::InvalidOutpoint(s.to_string()));
        }
        Ok(Self::new(txid, vout))
    }
}

/// Balance as reported by a provider's direct balance capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderBalance {
    pub total: u64,
    pub confirmed: u64,
    pub unconfirmed: u64,
}

impl ProviderBalance {
    pub fn new(confirmed: u64, unconfirmed: u64) -> Self {
        Self {
            total: confirmed.saturating_add(unconfirmed),
            confirmed,
            unconfirmed,
        }
    }
}

/// A signed artifact ready for the broadcast collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedArtifact {
    /// Signed PSBT, in whatever encoding the provider returned
    Psbt(String),

    /// Fully signed raw transaction (hex) for the given network
    RawTransaction {
        hex: String,
        network: crate::config::NetworkType,
    },
}

/// Result of a successful broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub txid: Option<String>,
}

/// Format satoshis as BTC for display
pub fn format_btc(sats: u64) -> String {
    format!("{:.8}", sats as f64 / 100_000_000.0)
}

/// Shorten an address or txid for display: `bc1qar0s...zwf5mdq`
pub fn format_short(value: &str, length: usize) -> String {
    if value.chars().count() <= length * 2 {
        return value.to_string();
    }
    let head: String = value.chars().take(length).collect();
    let tail: String = value
        .chars()
        .rev()
        .take(length)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}
