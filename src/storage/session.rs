//! Session-scoped key/value storage
//!
//! Lives exactly as long as the process session; nothing here ever touches
//! disk, so values cannot survive a restart.

use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::Zeroizing;

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);
}

/// Process-memory session store; values are zeroized when replaced or removed
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, Zeroizing<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().ok()?;
        values.get(key).map(|v| v.as_str().to_string())
    }

    fn set(&self, key: &str, value: &str) {
        match self.values.lock() {
            Ok(mut values) => {
                values.insert(key.to_string(), Zeroizing::new(value.to_string()));
            }
            Err(_) => log::error!("Session store lock poisoned; '{}' not stored", key),
        }
    }

    fn remove(&self, key: &str) {
        match self.values.lock() {
            Ok(mut values) => {
                values.remove(key);
            }
            Err(_) => log::error!("Session store lock poisoned; '{}' not removed", key),
        }
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self
            .values
            .lock()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MemorySessionStore").field("keys", &keys).finish()
    }
}
