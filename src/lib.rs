//! ORC Wallet
//!
//! Wallet provider abstraction and transaction-signing core for ORC20 tokens
//! and ORC721 NFTs: provider discovery, connection lifecycle, manual key
//! vault, UTXO selection, fee estimation and the sign-then-broadcast flow.

pub mod bitcoin;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod manager;
pub mod provider;
pub mod signing;
pub mod storage;
pub mod types;
