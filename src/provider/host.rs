//! Host environment probing
//!
//! Signing extensions inject capability objects into their host (for a
//! browser, `window.unisat` or `window.okxwallet.bitcoin`). The registry
//! never touches a host directly; it asks an [`EnvironmentProbe`] for the
//! object registered under a path.

use crate::types::ProviderBalance;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Failure reported by a host capability object
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Raw capability object injected by a signing extension
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<String>, HostError>;

    async fn get_accounts(&self) -> Result<Vec<String>, HostError>;

    /// Network name as the extension reports it (e.g. `livenet`)
    async fn get_network(&self) -> Result<String, HostError>;

    async fn get_public_key(&self) -> Result<String, HostError>;

    async fn sign_message(&self, message: &str, address: &str) -> Result<String, HostError>;

    async fn sign_psbt(&self, psbt: &str) -> Result<String, HostError>;

    /// `None` when the object has no balance method
    async fn get_balance(&self) -> Result<Option<ProviderBalance>, HostError> {
        Ok(None)
    }

    /// `accountsChanged` event stream, when the object emits one
    fn accounts_changed(&self) -> Option<broadcast::Receiver<()>> {
        None
    }
}

/// Looks up injected capability objects by path
pub trait EnvironmentProbe: Send + Sync {
    fn lookup(&self, path: &str) -> Option<Arc<dyn InjectedWallet>>;
}

/// Environment with no injected objects (CLI, daemons, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostEnvironment;

impl EnvironmentProbe for NoHostEnvironment {
    fn lookup(&self, _path: &str) -> Option<Arc<dyn InjectedWallet>> {
        None
    }
}

/// Environment backed by an explicit table of injected objects
///
/// Embedders that bridge to real extensions register their bridge objects
/// here; tests register doubles.
#[derive(Clone, Default)]
pub struct StaticEnvironment {
    objects: HashMap<String, Arc<dyn InjectedWallet>>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, object: Arc<dyn InjectedWallet>) -> Self {
        self.objects.insert(path.into(), object);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, object: Arc<dyn InjectedWallet>) {
        self.objects.insert(path.into(), object);
    }

    pub fn remove(&mut self, path: &str) {
        self.objects.remove(path);
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn lookup(&self, path: &str) -> Option<Arc<dyn InjectedWallet>> {
        self.objects.get(path).cloned()
    }
}
