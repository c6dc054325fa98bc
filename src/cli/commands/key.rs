//! Key command implementations

use crate::storage::KeyFormat;

/// Report whether `key` is an acceptable private key and in which format
///
/// The key itself is never echoed back.
pub fn validate(key: &str) -> bool {
    match KeyFormat::detect(key) {
        Some(format) => {
            let label = match format {
                KeyFormat::WifMainnet => "WIF (mainnet)",
                KeyFormat::WifTestnet => "WIF (testnet)",
                KeyFormat::Hex => "raw hex",
            };
            println!("✓ Valid private key format: {}", label);
            true
        }
        None => {
            println!("✗ Invalid private key format");
            println!("  Expected WIF (starting with 5, K, L, 9 or c) or 64 hex characters");
            false
        }
    }
}
