//! Hand-off of signed artifacts to the broadcast collaborator
//!
//! Signed PSBTs go to the ORC backend, which finalizes and relays them.
//! Raw transactions go straight to Esplora.

use crate::bitcoin::network::{ApiNetwork, EsploraClient, NetworkError};
use crate::types::{BroadcastReceipt, SignedArtifact};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, artifact: &SignedArtifact) -> Result<BroadcastReceipt, NetworkError>;
}

#[derive(Debug, Deserialize)]
struct BackendResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<BackendBroadcastData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackendBroadcastData {
    #[serde(default)]
    txid: Option<String>,
}

/// Routes signed artifacts to the backend or Esplora
#[derive(Debug, Clone)]
pub struct BroadcastClient {
    client: reqwest::Client,
    backend_url: String,
    esplora: EsploraClient,
}

impl BroadcastClient {
    pub fn new(
        backend_url: &str,
        esplora: EsploraClient,
        timeout: std::time::Duration,
    ) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            esplora,
        })
    }

    async fn broadcast_psbt(&self, signed_psbt: &str) -> Result<BroadcastReceipt, NetworkError> {
        let url = format!("{}/transactions/broadcast", self.backend_url);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "signed_psbt": signed_psbt }))
            .send()
            .await?;
        let status = response.status();

        // The backend reports rejections in the body, sometimes with a 4xx.
        let body: BackendResponse = response.json().await.map_err(|e| NetworkError::Decode {
            url: url.clone(),
            message: format!("status {}: {}", status.as_u16(), e),
        })?;

        if !status.is_success() || !body.success {
            return Err(NetworkError::Rejected(
                body.error
                    .unwrap_or_else(|| "Failed to broadcast transaction".to_string()),
            ));
        }

        let txid = body.data.and_then(|d| d.txid);
        log::info!(
            "✓ Signed PSBT broadcast{}",
            txid.as_deref()
                .map(|t| format!(": {}", t))
                .unwrap_or_default()
        );
        Ok(BroadcastReceipt { txid })
    }
}

#[async_trait]
impl Broadcaster for BroadcastClient {
    async fn broadcast(&self, artifact: &SignedArtifact) -> Result<BroadcastReceipt, NetworkError> {
        match artifact {
            SignedArtifact::Psbt(psbt) => self.broadcast_psbt(psbt).await,
            SignedArtifact::RawTransaction { hex, network } => {
                let txid = self
                    .esplora
                    .broadcast_transaction(ApiNetwork::from(*network), hex)
                    .await?;
                log::info!("✓ Transaction broadcast: {}", txid);
                Ok(BroadcastReceipt { txid: Some(txid) })
            }
        }
    }
}
