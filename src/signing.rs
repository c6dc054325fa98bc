//! Signing of ORC operations through the connected provider
//!
//! The coordinator never broadcasts; signed artifacts are handed back to the
//! caller, which decides whether to submit them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{ConnectionError, ConnectionStateMachine};
use crate::error::{validate_address, ValidationError};
use crate::provider::{ProviderError, WalletProviderDescriptor};
use crate::storage::PrivateKeyRecord;
use crate::types::SignedArtifact;

const NONCE_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NONCE_LEN: usize = 8;

/// Signing errors
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{provider} refused to sign: {message}")]
    Rejected { provider: String, message: String },

    #[error("Failed to encode signing message: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SigningError {
    fn from_provider(provider: &str, error: ProviderError) -> Self {
        let message = match error {
            ProviderError::Request { message, .. }
            | ProviderError::InvalidResponse { message, .. } => message,
            other => other.to_string(),
        };
        SigningError::Rejected {
            provider: provider.to_string(),
            message,
        }
    }
}

/// ORC operation being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "ORC20_DEPLOY")]
    TokenDeploy,
    #[serde(rename = "ORC20_TRANSFER")]
    TokenTransfer,
    #[serde(rename = "ORC721_DEPLOY")]
    NftDeploy,
    #[serde(rename = "ORC721_TRANSFER")]
    NftTransfer,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            TransactionKind::TokenDeploy => "ORC20_DEPLOY",
            TransactionKind::TokenTransfer => "ORC20_TRANSFER",
            TransactionKind::NftDeploy => "ORC721_DEPLOY",
            TransactionKind::NftTransfer => "ORC721_TRANSFER",
        };
        f.write_str(tag)
    }
}

/// A request to authorize one ORC operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Operation payload, signed as-is
    pub data: Value,

    /// Fee rate (sat/vB)
    #[serde(default)]
    pub fee: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl SigningRequest {
    pub fn new(kind: TransactionKind, data: Value, fee: u64) -> Self {
        Self {
            kind,
            data,
            fee,
            recipient: None,
            amount: None,
            token_id: None,
        }
    }

    pub fn with_recipient(mut self, recipient: &str) -> Result<Self, ValidationError> {
        validate_address(recipient)?;
        self.recipient = Some(recipient.trim().to_string());
        Ok(self)
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// Parse a request, validating the recipient address if there is one
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let request: SigningRequest = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidPayload(e.to_string()))?;
        if let Some(recipient) = &request.recipient {
            validate_address(recipient)?;
        }
        Ok(request)
    }
}

#[derive(Serialize)]
struct SigningMessage<'a> {
    #[serde(rename = "type")]
    kind: TransactionKind,
    data: &'a Value,
    timestamp: i64,
    nonce: &'a str,
    address: &'a str,
}

/// A built and signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub message: String,
    pub signature: String,
    pub address: String,
}

/// Who can sign right now
#[derive(Debug, Clone)]
pub enum Signer {
    Provider {
        descriptor: WalletProviderDescriptor,
        address: String,
    },
    LocalKey(PrivateKeyRecord),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SigningCoordinator;

impl SigningCoordinator {
    pub fn new() -> Self {
        Self
    }

    fn require_connected(
        connection: &ConnectionStateMachine,
    ) -> Result<(&WalletProviderDescriptor, &str), ConnectionError> {
        let state = connection.state();
        if !state.connected() {
            return Err(ConnectionError::NotConnected);
        }
        let provider = state.provider().ok_or(ConnectionError::NoProvider)?;
        let address = state.address().ok_or(ConnectionError::NotConnected)?;
        Ok((provider, address))
    }

    /// Sign an arbitrary message with the connected address
    pub async fn sign_message(
        &self,
        connection: &ConnectionStateMachine,
        message: &str,
    ) -> Result<String, SigningError> {
        let (descriptor, address) = Self::require_connected(connection)?;
        log::debug!("Requesting message signature from {}", descriptor.name());

        descriptor
            .provider()
            .sign_message(message, address)
            .await
            .map_err(|e| SigningError::from_provider(descriptor.name(), e))
    }

    /// Have the connected provider sign a PSBT
    pub async fn sign_psbt(
        &self,
        connection: &ConnectionStateMachine,
        psbt: &str,
    ) -> Result<SignedArtifact, SigningError> {
        let (descriptor, _) = Self::require_connected(connection)?;
        if psbt.trim().is_empty() {
            return Err(ValidationError::InvalidPsbt("PSBT is empty".to_string()).into());
        }

        log::debug!("Requesting PSBT signature from {}", descriptor.name());
        let signed = descriptor
            .provider()
            .sign_psbt(psbt.trim())
            .await
            .map_err(|e| SigningError::from_provider(descriptor.name(), e))?;

        log::info!("✓ PSBT signed by {}", descriptor.name());
        Ok(SignedArtifact::Psbt(signed))
    }

    /// Canonical message for `request`, stamped now with a fresh nonce
    pub fn build_signing_message(
        &self,
        connection: &ConnectionStateMachine,
        request: &SigningRequest,
    ) -> Result<String, SigningError> {
        let (_, address) = Self::require_connected(connection)?;
        let timestamp = chrono::Utc::now().timestamp_millis();
        let nonce = generate_nonce();
        build_signing_message_with(request, address, timestamp, &nonce)
    }

    /// Build the canonical message for `request` and sign it
    pub async fn sign_request(
        &self,
        connection: &ConnectionStateMachine,
        request: &SigningRequest,
    ) -> Result<SignedRequest, SigningError> {
        let message = self.build_signing_message(connection, request)?;
        let signature = self.sign_message(connection, &message).await?;
        let address = connection
            .state()
            .address()
            .ok_or(ConnectionError::NotConnected)?
            .to_string();

        log::info!("✓ {} request signed", request.kind);
        Ok(SignedRequest {
            message,
            signature,
            address,
        })
    }

    /// The connected provider if there is one, else the manually entered key
    pub fn resolve_signer(&self, connection: &mut ConnectionStateMachine) -> Option<Signer> {
        if let Ok((descriptor, address)) = Self::require_connected(connection) {
            return Some(Signer::Provider {
                descriptor: descriptor.clone(),
                address: address.to_string(),
            });
        }

        connection.vault_mut().get().cloned().map(Signer::LocalKey)
    }
}

/// Canonical message: `{type, data, timestamp, nonce, address}` in that order
pub fn build_signing_message_with(
    request: &SigningRequest,
    address: &str,
    timestamp_ms: i64,
    nonce: &str,
) -> Result<String, SigningError> {
    let message = SigningMessage {
        kind: request.kind,
        data: &request.data,
        timestamp: timestamp_ms,
        nonce,
        address,
    };
    Ok(serde_json::to_string(&message)?)
}

/// Random lowercase alphanumeric token
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| NONCE_CHARSET[rng.gen_range(0..NONCE_CHARSET.len())] as char)
        .collect()
}
