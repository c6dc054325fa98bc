//! Fee rate estimation
//!
//! Advisory only: any failure falls back to a fixed rate so a transaction
//! flow is never blocked on the fee service.

use crate::bitcoin::network::{EsploraClient, NetworkError, RecommendedFees};
use async_trait::async_trait;
use std::sync::Arc;

/// Fee rate (sat/vB) used when the fee service cannot answer
pub const DEFAULT_FEE_RATE: u64 = 10;

/// External fee recommendation service
#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn recommended_fees(&self) -> Result<RecommendedFees, NetworkError>;
}

#[async_trait]
impl FeeSource for EsploraClient {
    async fn recommended_fees(&self) -> Result<RecommendedFees, NetworkError> {
        self.get_recommended_fees().await
    }
}

pub struct FeeEstimator {
    source: Arc<dyn FeeSource>,
    default_rate: u64,
}

impl FeeEstimator {
    pub fn new(source: Arc<dyn FeeSource>) -> Self {
        Self {
            source,
            default_rate: DEFAULT_FEE_RATE,
        }
    }

    pub fn with_default_rate(mut self, rate: u64) -> Self {
        self.default_rate = rate;
        self
    }

    pub fn default_rate(&self) -> u64 {
        self.default_rate
    }

    /// "Confirm within about an hour" rate, rounded up
    pub async fn estimate(&self) -> u64 {
        match self.source.recommended_fees().await {
            Ok(fees) => match hour_rate(&fees) {
                Some(rate) => rate,
                None => {
                    log::warn!(
                        "Fee service returned no usable hour tier, using {} sat/vB",
                        self.default_rate
                    );
                    self.default_rate
                }
            },
            Err(e) => {
                log::warn!(
                    "Error estimating fee rate: {}; using {} sat/vB",
                    e,
                    self.default_rate
                );
                self.default_rate
            }
        }
    }
}

fn hour_rate(fees: &RecommendedFees) -> Option<u64> {
    let rate = fees.hour_fee?;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }
    Some(rate.ceil() as u64)
}

impl std::fmt::Debug for FeeEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeEstimator")
            .field("default_rate", &self.default_rate)
            .finish()
    }
}
