//! Esplora / mempool.space HTTP client
//!
//! Serves UTXO listings, output spend status, recommended fees, address
//! balances and raw transaction broadcast. The endpoint is either pinned by
//! configuration or derived from the address prefix of each request.

use crate::config::{BitcoinConfig, NetworkType};
use crate::types::{Outpoint, ProviderBalance, Utxo};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Errors that can occur during network operations
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Broadcast rejected: {0}")]
    Rejected(String),
}

/// Public explorer deployment an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiNetwork {
    Mainnet,
    Testnet,
    Testnet4,
    Regtest,
}

impl ApiNetwork {
    /// Derive the explorer deployment from an address prefix
    ///
    /// `ms` must be checked before the generic `m` testnet prefix.
    pub fn from_address(address: &str) -> Self {
        if address.starts_with("bcrt1") {
            ApiNetwork::Regtest
        } else if address.starts_with("ms") {
            ApiNetwork::Testnet4
        } else if address.starts_with("tb1")
            || address.starts_with('2')
            || address.starts_with('m')
            || address.starts_with('n')
        {
            ApiNetwork::Testnet
        } else {
            ApiNetwork::Mainnet
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            ApiNetwork::Mainnet => "https://mempool.space/api",
            ApiNetwork::Testnet => "https://mempool.space/testnet/api",
            ApiNetwork::Testnet4 => "https://mempool.space/testnet4/api",
            ApiNetwork::Regtest => "http://localhost:3002",
        }
    }
}

impl From<NetworkType> for ApiNetwork {
    fn from(network: NetworkType) -> Self {
        match network {
            NetworkType::Mainnet => ApiNetwork::Mainnet,
            NetworkType::Testnet => ApiNetwork::Testnet,
            NetworkType::Regtest => ApiNetwork::Regtest,
        }
    }
}

/// Spend status of a single output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutspendStatus {
    pub spent: bool,

    /// Spending transaction, when spent
    #[serde(default, rename = "txid")]
    pub spending_txid: Option<String>,
}

/// Tiered fee recommendation (sat/vB) from `/v1/fees/recommended`
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFees {
    #[serde(default)]
    pub fastest_fee: Option<f64>,
    #[serde(default)]
    pub half_hour_fee: Option<f64>,
    #[serde(default)]
    pub hour_fee: Option<f64>,
    #[serde(default)]
    pub economy_fee: Option<f64>,
    #[serde(default)]
    pub minimum_fee: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
    #[serde(default)]
    scriptpubkey: Option<String>,
    #[serde(default)]
    status: Option<EsploraTxStatus>,
}

#[derive(Debug, Deserialize)]
struct EsploraTxStatus {
    confirmed: bool,
}

#[derive(Debug, Deserialize)]
struct EsploraAddress {
    chain_stats: EsploraAddressStats,
    #[serde(default)]
    mempool_stats: Option<EsploraAddressStats>,
}

#[derive(Debug, Deserialize)]
struct EsploraAddressStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
}

impl EsploraAddressStats {
    fn net(&self) -> u64 {
        self.funded_txo_sum.saturating_sub(self.spent_txo_sum)
    }
}

impl EsploraAddress {
    /// Confirmed balance plus the mempool delta
    ///
    /// A pending spend lowers the total below the confirmed balance; it is
    /// never reported as a negative unconfirmed amount.
    fn balance(&self) -> ProviderBalance {
        let confirmed = self.chain_stats.net();
        let (funded, spent) = match &self.mempool_stats {
            Some(mempool) => (
                self.chain_stats
                    .funded_txo_sum
                    .saturating_add(mempool.funded_txo_sum),
                self.chain_stats
                    .spent_txo_sum
                    .saturating_add(mempool.spent_txo_sum),
            ),
            None => (self.chain_stats.funded_txo_sum, self.chain_stats.spent_txo_sum),
        };
        let total = funded.saturating_sub(spent);

        ProviderBalance {
            total,
            confirmed,
            unconfirmed: total.saturating_sub(confirmed),
        }
    }
}

impl EsploraUtxo {
    fn into_utxo(self) -> Option<Utxo> {
        if ::bitcoin::Txid::from_str(&self.txid).is_err() {
            log::warn!("Dropping UTXO with malformed txid '{}'", self.txid);
            return None;
        }
        if self.value == 0 {
            log::warn!("Dropping zero-value UTXO {}:{}", self.txid, self.vout);
            return None;
        }
        Some(Utxo {
            txid: self.txid,
            vout: self.vout,
            value: self.value,
            script_pubkey: self.scriptpubkey,
            confirmed: self.status.map(|s| s.confirmed),
        })
    }
}

/// Esplora client wrapper for blockchain queries
#[derive(Clone)]
pub struct EsploraClient {
    client: reqwest::Client,

    /// Pinned Esplora URL; `None` follows address prefixes
    base_url: Option<String>,

    /// Deployment for requests without an address (fee tiers)
    fee_network: ApiNetwork,
}

impl EsploraClient {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = EsploraClient::new(Some("http://localhost:3002"), Duration::from_secs(30))?;
    /// ```
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            fee_network: ApiNetwork::Mainnet,
        })
    }

    pub fn from_config(config: &BitcoinConfig) -> Result<Self, NetworkError> {
        Ok(Self::new(config.esplora_url.as_deref(), config.request_timeout())?
            .with_fee_network(config.network().into()))
    }

    pub fn with_fee_network(mut self, network: ApiNetwork) -> Self {
        self.fee_network = network;
        self
    }

    /// Pinned URL, if any
    pub fn pinned_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Explorer base URL serving `address`
    pub fn url_for_address(&self, address: &str) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => ApiNetwork::from_address(address).default_url().to_string(),
        }
    }

    fn url_for_network(&self, network: ApiNetwork) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => network.default_url().to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetworkError> {
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NetworkError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// List UTXOs for an address, dropping malformed entries
    pub async fn get_address_utxos(&self, address: &str) -> Result<Vec<Utxo>, NetworkError> {
        let url = format!("{}/address/{}/utxo", self.url_for_address(address), address);
        let raw: Vec<EsploraUtxo> = self.get_json(&url).await?;
        let fetched = raw.len();

        let utxos: Vec<Utxo> = raw.into_iter().filter_map(EsploraUtxo::into_utxo).collect();
        log::debug!(
            "Fetched {} UTXO(s) for {} ({} usable)",
            fetched,
            address,
            utxos.len()
        );

        Ok(utxos)
    }

    /// Spend status of an output; an unknown output is `NotFound`
    pub async fn get_outspend(
        &self,
        address: &str,
        outpoint: &Outpoint,
    ) -> Result<OutspendStatus, NetworkError> {
        let url = format!(
            "{}/tx/{}/outspend/{}",
            self.url_for_address(address),
            outpoint.txid,
            outpoint.vout
        );
        self.get_json(&url).await
    }

    /// Fee tier endpoint: pinned URL when configured, else the fee network's
    pub fn fees_url(&self) -> String {
        format!("{}/v1/fees/recommended", self.url_for_network(self.fee_network))
    }

    pub async fn get_recommended_fees(&self) -> Result<RecommendedFees, NetworkError> {
        self.get_json(&self.fees_url()).await
    }

    /// Confirmed and mempool balance of an address
    pub async fn get_address_balance(&self, address: &str) -> Result<ProviderBalance, NetworkError> {
        let url = format!("{}/address/{}", self.url_for_address(address), address);
        let info: EsploraAddress = self.get_json(&url).await?;
        Ok(info.balance())
    }

    /// Broadcast a raw transaction (hex); returns the txid
    pub async fn broadcast_transaction(
        &self,
        network: ApiNetwork,
        tx_hex: &str,
    ) -> Result<String, NetworkError> {
        let url = format!("{}/tx", self.url_for_network(network));
        log::debug!("Broadcasting transaction to: {}", url);

        let response = self
            .client
            .post(&url)
            .body(tx_hex.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NetworkError::Rejected(error_text));
        }

        let txid = response.text().await?;
        Ok(txid.trim().to_string())
    }
}

impl std::fmt::Debug for EsploraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsploraClient")
            .field("base_url", &self.base_url)
            .field("fee_network", &self.fee_network)
            .finish()
    }
}
