//! Wallet connection lifecycle
//!
//! Owns the session's connection state, the manually entered key and the
//! persisted reconnection record.

pub mod machine;
pub mod state;

pub use machine::{ConnectionStateMachine, ReconnectOutcome};
pub use state::{transition, ConnectionSnapshot, ConnectionState, Event, Phase};

use crate::provider::ProviderError;

/// Connection errors
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("No wallet provider available")]
    NoProvider,

    #[error("Wallet provider not found: {0}")]
    ProviderNotFound(String),

    #[error("No accounts found")]
    NoAccounts,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid transition: {event} while {from}")]
    InvalidTransition { from: Phase, event: Event },
}
