//! Storage data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last successful connection, used for silent reconnection on relaunch
///
/// Saved to: `<data_dir>/connection.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConnection {
    /// Provider name (e.g. "Unisat")
    pub wallet_name: String,

    /// Address that was connected
    pub address: String,

    /// When the record was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedConnection {
    pub fn new(wallet_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            wallet_name: wallet_name.into(),
            address: address.into(),
            saved_at: Some(Utc::now()),
        }
    }
}
