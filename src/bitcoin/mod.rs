//! Bitcoin data layer
//!
//! Handles explorer access, UTXO selection, fee estimation and broadcast

pub mod balance;
pub mod broadcast;
pub mod fee;
pub mod network;
pub mod utxo;

pub use balance::BalanceSource;
pub use broadcast::{BroadcastClient, Broadcaster};
pub use fee::{FeeEstimator, FeeSource, DEFAULT_FEE_RATE};
pub use network::{ApiNetwork, EsploraClient, NetworkError, OutspendStatus, RecommendedFees};
pub use utxo::{select_first_fit, InputStatus, UtxoSelector, UtxoSource, DEFAULT_MIN_UTXO_VALUE};
