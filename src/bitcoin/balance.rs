//! Address balance lookups for providers without a balance capability

use crate::bitcoin::network::{EsploraClient, NetworkError};
use crate::types::ProviderBalance;
use async_trait::async_trait;

#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn address_balance(&self, address: &str) -> Result<ProviderBalance, NetworkError>;
}

#[async_trait]
impl BalanceSource for EsploraClient {
    async fn address_balance(&self, address: &str) -> Result<ProviderBalance, NetworkError> {
        self.get_address_balance(address).await
    }
}
