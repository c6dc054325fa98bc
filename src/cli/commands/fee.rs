//! Fee command implementations

use super::Context;
use crate::manager::ManagerError;

/// Print the recommended fee rate (falls back to the configured default)
pub async fn show(ctx: &Context) -> Result<(), ManagerError> {
    let manager = ctx.manager()?;
    let rate = manager.fees().estimate().await;

    println!("Recommended fee rate: {} sat/vB", rate);
    println!("  (default when unavailable: {} sat/vB)", manager.fees().default_rate());
    Ok(())
}
