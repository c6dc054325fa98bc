//! Broadcast command implementations

use super::Context;
use crate::manager::ManagerError;
use crate::types::SignedArtifact;

/// Broadcast a signed PSBT through the backend or a raw transaction through
/// Esplora
pub async fn run(
    ctx: &Context,
    psbt: Option<String>,
    raw: Option<String>,
) -> Result<(), ManagerError> {
    let manager = ctx.manager()?;

    let artifact = match (psbt, raw) {
        (Some(psbt), _) => SignedArtifact::Psbt(psbt.trim().to_string()),
        (None, Some(hex)) => SignedArtifact::RawTransaction {
            hex: hex.trim().to_string(),
            network: manager.config().bitcoin.network(),
        },
        (None, None) => {
            return Err(crate::error::ValidationError::InvalidPsbt(
                "nothing to broadcast".to_string(),
            )
            .into())
        }
    };

    let receipt = manager.broadcast(&artifact).await?;

    match receipt.txid {
        Some(txid) => println!("✓ Broadcast accepted: {}", txid),
        None => println!("✓ Broadcast accepted"),
    }
    Ok(())
}
