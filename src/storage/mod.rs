//! Storage layer for wallet data
//!
//! Persists the last connection record and keeps the manually entered key
//! in session memory.

pub mod file_system;
pub mod keys;
pub mod models;
pub mod session;

pub use file_system::{ConnectionStore, FileConnectionStore, MemoryConnectionStore, StorageError};
pub use keys::{KeyFormat, PrivateKeyRecord, PrivateKeyVault, SESSION_KEY};
pub use models::PersistedConnection;
pub use session::{MemorySessionStore, SessionStore};
