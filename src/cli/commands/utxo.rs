//! UTXO command implementations

use super::Context;
use crate::bitcoin::InputStatus;
use crate::manager::{ManagerError, WalletManager};
use crate::provider::NoHostEnvironment;
use crate::types::{format_btc, format_short, Outpoint, Utxo};
use std::sync::Arc;

/// List UTXOs for `address` and the one that would be selected
pub async fn list(
    ctx: &Context,
    address: &str,
    min_value: Option<u64>,
) -> Result<(), ManagerError> {
    let mut config = ctx.load_config()?;
    if let Some(min) = min_value {
        config.bitcoin.min_utxo_value = min;
    }

    let mut manager = WalletManager::new(config, Arc::new(NoHostEnvironment))?;
    let plan = manager.prepare_funding(Some(address)).await?;

    if plan.utxos.is_empty() {
        println!("No UTXOs found for {}", plan.address);
    } else {
        println!("UTXOs for {}:", format_short(&plan.address, 10));
        for utxo in &plan.utxos {
            let marker = match &plan.selected {
                Some(s) if s.outpoint() == utxo.outpoint() => "→",
                _ => " ",
            };
            let confirmed = match utxo.confirmed {
                Some(true) => "confirmed",
                Some(false) => "unconfirmed",
                None => "",
            };
            println!(
                "  {} {}  {:>12} sats ({} BTC)  {}",
                marker,
                utxo.outpoint(),
                utxo.value,
                format_btc(utxo.value),
                confirmed
            );
        }
    }

    println!();
    match &plan.selected {
        Some(utxo) => println!("Selected: {}", utxo.outpoint()),
        None => println!(
            "No UTXO of at least {} sats available",
            manager.selector().min_value()
        ),
    }
    println!("Fee rate: {} sat/vB", plan.fee_rate);

    Ok(())
}

/// Check the spend status of one output
pub async fn check(ctx: &Context, address: &str, outpoint: &str) -> Result<(), ManagerError> {
    let outpoint: Outpoint = outpoint.parse()?;
    let manager = ctx.manager()?;

    // Only the outpoint matters to the spend check.
    let utxo = Utxo::new(outpoint.txid.clone(), outpoint.vout, 0);
    match manager.verify_input(address, &utxo).await? {
        InputStatus::Unspent => println!("✓ {} is unspent", outpoint),
        InputStatus::Spent { by: Some(txid) } => {
            println!("✗ {} was spent by {}", outpoint, txid)
        }
        InputStatus::Spent { by: None } => println!("✗ {} has been spent", outpoint),
        InputStatus::Unknown => println!("? {} is unknown to the explorer", outpoint),
    }
    Ok(())
}
