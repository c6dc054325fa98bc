//! ORC Wallet CLI
//!
//! Command-line access to UTXO selection, fee estimation, key validation
//! and broadcast for ORC token operations

use clap::Parser;
use orc_wallet::cli::args::{Cli, Commands, ConfigAction, ConnectionAction, KeyAction};
use orc_wallet::cli::commands::{self, Context};
use orc_wallet::config::{ConfigOverrides, NetworkType};
use std::path::PathBuf;
use std::process;

async fn run(cli: Cli, ctx: Context) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { network } => {
                commands::config::init(network, ctx.config_path.as_deref()).map_err(Into::into)
            }
        },

        Commands::Providers => commands::provider::list().map_err(Into::into),

        Commands::Utxos { address, min_value } => {
            commands::utxo::list(&ctx, &address, min_value)
                .await
                .map_err(Into::into)
        }

        Commands::CheckUtxo { address, outpoint } => {
            commands::utxo::check(&ctx, &address, &outpoint)
                .await
                .map_err(Into::into)
        }

        Commands::Fee => commands::fee::show(&ctx).await.map_err(Into::into),

        Commands::Key { action } => match action {
            KeyAction::Validate { key } => {
                if commands::key::validate(&key) {
                    Ok(())
                } else {
                    Err("invalid private key".into())
                }
            }
        },

        Commands::Connection { action } => match action {
            ConnectionAction::Show => commands::connection::show(&ctx).map_err(Into::into),
            ConnectionAction::Forget => commands::connection::forget(&ctx).map_err(Into::into),
        },

        Commands::Broadcast(args) => commands::broadcast::run(&ctx, args.psbt, args.raw)
            .await
            .map_err(Into::into),
    }
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let network = match cli.network.as_deref().map(str::parse::<NetworkType>) {
        Some(Ok(network)) => Some(network),
        Some(Err(e)) => {
            eprintln!("Error: {}. Use: mainnet, testnet or regtest", e);
            process::exit(1);
        }
        None => None,
    };

    let ctx = Context {
        config_path: cli.config.as_ref().map(PathBuf::from),
        overrides: ConfigOverrides {
            network,
            esplora_url: cli.esplora_url.clone(),
            backend_url: cli.backend_url.clone(),
            data_dir: cli.data_dir.clone(),
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli, ctx)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
