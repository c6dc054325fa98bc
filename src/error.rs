//! Validation errors shared across layers
//!
//! Connection, network and signing failures live next to the code that
//! raises them; input validation is common to the vault, the signing
//! requests and the CLI, so it is defined once here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid private key format")]
    InvalidPrivateKey,

    #[error("Invalid private key: {0}")]
    UndecodablePrivateKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid outpoint: {0}")]
    InvalidOutpoint(String),

    #[error("Invalid PSBT: {0}")]
    InvalidPsbt(String),
}

/// Check that a string parses as a Bitcoin address on any network
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    use std::str::FromStr;

    ::bitcoin::Address::<::bitcoin::address::NetworkUnchecked>::from_str(address.trim())
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidAddress(format!("{}: {}", address, e)))
}
