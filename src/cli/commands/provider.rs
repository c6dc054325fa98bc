//! Provider command implementations

use crate::manager::ManagerError;
use crate::provider::{NoHostEnvironment, ProviderRegistry};
use std::sync::Arc;

/// List known and detected wallet providers
pub fn list() -> Result<(), ManagerError> {
    // A terminal session has no injected wallet objects.
    let registry = ProviderRegistry::new(Arc::new(NoHostEnvironment));
    let detected = registry.detect();

    println!("Known providers:");
    for name in registry.known() {
        let status = if detected.iter().any(|d| d.name() == name) {
            "detected"
        } else {
            "not detected"
        };
        println!("  {:<10} {}", name, status);
    }

    if detected.is_empty() {
        println!();
        println!("No wallet providers available in this environment.");
    }

    Ok(())
}
