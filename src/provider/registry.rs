//! Provider discovery

use super::host::{EnvironmentProbe, InjectedWallet};
use super::injected::{InjectedProvider, ProviderProfile, OKX, UNISAT};
use super::{WalletProvider, WalletProviderDescriptor};
use std::sync::Arc;

type ProviderFactory = dyn Fn(Arc<dyn InjectedWallet>) -> Arc<dyn WalletProvider> + Send + Sync;

/// A known provider: where to look for it and how to wrap what is found
#[derive(Clone)]
pub struct ProviderSpec {
    name: String,
    path: String,
    factory: Arc<ProviderFactory>,
}

impl ProviderSpec {
    pub fn new<F>(name: impl Into<String>, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Arc<dyn InjectedWallet>) -> Arc<dyn WalletProvider> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            path: path.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn from_profile(profile: ProviderProfile) -> Self {
        Self::new(profile.name, profile.path, move |host| {
            Arc::new(InjectedProvider::new(profile, host)) as Arc<dyn WalletProvider>
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

/// Enumerates installed signing providers
#[derive(Clone)]
pub struct ProviderRegistry {
    probe: Arc<dyn EnvironmentProbe>,
    specs: Vec<ProviderSpec>,
}

impl ProviderRegistry {
    /// Registry that knows Unisat and OKX, in that detection order
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self {
            probe,
            specs: vec![
                ProviderSpec::from_profile(UNISAT),
                ProviderSpec::from_profile(OKX),
            ],
        }
    }

    /// Registry with no known providers
    pub fn empty(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self {
            probe,
            specs: Vec::new(),
        }
    }

    /// Add a provider. A spec whose name is already known replaces it.
    pub fn register(&mut self, spec: ProviderSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    /// Providers whose capability object is present, in detection order
    pub fn detect(&self) -> Vec<WalletProviderDescriptor> {
        let detected: Vec<WalletProviderDescriptor> = self
            .specs
            .iter()
            .filter_map(|spec| {
                self.probe
                    .lookup(&spec.path)
                    .map(|host| WalletProviderDescriptor::new((spec.factory)(host)))
            })
            .collect();

        log::debug!(
            "Detected {} wallet provider(s): [{}]",
            detected.len(),
            detected
                .iter()
                .map(|d| d.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        detected
    }

    pub fn find(&self, name: &str) -> Option<WalletProviderDescriptor> {
        self.detect().into_iter().find(|d| d.name() == name)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("specs", &self.specs)
            .finish()
    }
}
