//! Connection state and its transition table

use crate::config::NetworkType;
use crate::connection::ConnectionError;
use crate::provider::WalletProviderDescriptor;

/// Lifecycle phase of the session's single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Disconnected => write!(f, "disconnected"),
            Phase::Connecting => write!(f, "connecting"),
            Phase::Connected => write!(f, "connected"),
        }
    }
}

/// Input to the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Connect,
    Established,
    Failed,
    Disconnect,
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Connect => write!(f, "connect"),
            Event::Established => write!(f, "established"),
            Event::Failed => write!(f, "failed"),
            Event::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// The transition table
///
/// Reconnecting while connected is allowed and goes through `Connecting`
/// again. Disconnecting while disconnected is a no-op.
pub fn transition(from: Phase, event: Event) -> Result<Phase, ConnectionError> {
    use Event::*;
    use Phase::*;

    match (from, event) {
        (Disconnected, Connect) | (Connected, Connect) => Ok(Connecting),
        (Connecting, Established) => Ok(Connected),
        (Connecting, Failed) => Ok(Disconnected),
        (Connected, Disconnect) | (Disconnected, Disconnect) => Ok(Disconnected),
        (from, event) => Err(ConnectionError::InvalidTransition { from, event }),
    }
}

/// Observable connection state
///
/// While connected, the provider, address, public key and network are all
/// set. While disconnected they are all empty and the balance is zero.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    pub(crate) phase: Phase,
    pub(crate) provider: Option<WalletProviderDescriptor>,
    pub(crate) address: Option<String>,
    pub(crate) public_key: Option<String>,
    pub(crate) network: Option<NetworkType>,
    pub(crate) balance: u64,
    pub(crate) loading: bool,
    pub(crate) last_error: Option<String>,
}

impl ConnectionState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    pub fn provider(&self) -> Option<&WalletProviderDescriptor> {
        self.provider.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn network(&self) -> Option<NetworkType> {
        self.network
    }

    /// Balance in satoshis
    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Plain-data copy for display and comparison
    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            connected: self.connected(),
            provider: self.provider.as_ref().map(|p| p.name().to_string()),
            address: self.address.clone(),
            public_key: self.public_key.clone(),
            network: self.network,
            balance: self.balance,
            loading: self.loading,
            last_error: self.last_error.clone(),
        }
    }

    /// Clear every connection-derived field
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionSnapshot {
    pub connected: bool,
    pub provider: Option<String>,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub network: Option<NetworkType>,
    pub balance: u64,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ConnectionState {
            phase: Phase::Connected,
            address: Some("bc1q".to_string()),
            public_key: Some("02ab".to_string()),
            network: Some(NetworkType::Mainnet),
            balance: 5_000,
            ..Default::default()
        };
        state.reset();
        assert_eq!(state.snapshot(), ConnectionSnapshot::default());
    }

    #[test]
    fn test_failed_only_from_connecting() {
        assert!(transition(Phase::Connected, Event::Failed).is_err());
        assert!(transition(Phase::Disconnected, Event::Failed).is_err());
        assert_eq!(
            transition(Phase::Connecting, Event::Failed).unwrap(),
            Phase::Disconnected
        );
    }
}
