//! Connection record command implementations

use super::Context;
use crate::config::data_dir;
use crate::manager::ManagerError;
use crate::storage::{ConnectionStore, FileConnectionStore};

fn store(ctx: &Context) -> Result<FileConnectionStore, ManagerError> {
    let config = ctx.load_config()?;
    Ok(FileConnectionStore::in_dir(&data_dir(&config)?))
}

/// Print the saved connection record
pub fn show(ctx: &Context) -> Result<(), ManagerError> {
    let store = store(ctx)?;

    match store.load()? {
        Some(record) => {
            println!("Saved connection:");
            println!("  Wallet:  {}", record.wallet_name);
            println!("  Address: {}", record.address);
            if let Some(saved_at) = record.saved_at {
                println!("  Saved:   {}", saved_at.to_rfc3339());
            }
        }
        None => println!("No saved connection ({})", store.path().display()),
    }
    Ok(())
}

/// Erase the saved connection record
pub fn forget(ctx: &Context) -> Result<(), ManagerError> {
    store(ctx)?.clear()?;
    println!("✓ Saved connection erased");
    Ok(())
}
