//! Integration tests for fee estimation

mod common;

use common::MockFeeSource;
use orc_wallet::bitcoin::{FeeEstimator, FeeSource, RecommendedFees, DEFAULT_FEE_RATE};
use std::sync::Arc;

fn estimator(source: Arc<MockFeeSource>) -> FeeEstimator {
    FeeEstimator::new(source as Arc<dyn FeeSource>)
}

#[tokio::test]
async fn test_uses_hour_tier() {
    assert_eq!(estimator(MockFeeSource::hour(12.0)).estimate().await, 12);
}

#[tokio::test]
async fn test_rounds_up() {
    assert_eq!(estimator(MockFeeSource::hour(4.2)).estimate().await, 5);
    assert_eq!(estimator(MockFeeSource::hour(0.5)).estimate().await, 1);
}

#[tokio::test]
async fn test_unreachable_service_gives_default() {
    let rate = estimator(MockFeeSource::failing()).estimate().await;
    assert_eq!(rate, DEFAULT_FEE_RATE);
    assert_eq!(rate, 10);
}

#[tokio::test]
async fn test_missing_or_nonpositive_tier_gives_default() {
    let no_hour = Arc::new(MockFeeSource {
        fees: Some(RecommendedFees {
            fastest_fee: Some(30.0),
            ..Default::default()
        }),
    });
    assert_eq!(estimator(no_hour).estimate().await, DEFAULT_FEE_RATE);

    assert_eq!(estimator(MockFeeSource::hour(0.0)).estimate().await, DEFAULT_FEE_RATE);
    assert_eq!(estimator(MockFeeSource::hour(-3.0)).estimate().await, DEFAULT_FEE_RATE);
    assert_eq!(
        estimator(MockFeeSource::hour(f64::NAN)).estimate().await,
        DEFAULT_FEE_RATE
    );
}

#[tokio::test]
async fn test_configured_default_rate() {
    let fees = estimator(MockFeeSource::failing()).with_default_rate(3);
    assert_eq!(fees.default_rate(), 3);
    assert_eq!(fees.estimate().await, 3);
}
