//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "orc-wallet",
    version,
    about = "ORC wallet core - UTXO, fee and broadcast tooling for ORC token operations",
    long_about = None
)]
pub struct Cli {
    /// Network: mainnet, testnet or regtest (overrides config). Selects the
    /// explorer for fees and raw broadcast; UTXO and spend-status queries
    /// follow the address prefix
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// Esplora server URL (overrides config and address-based selection)
    #[arg(long, global = true)]
    pub esplora_url: Option<String>,

    /// ORC backend base URL (overrides config)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Custom data directory for the connection record
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Config file path (default: ~/.orc-wallet/config.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize or manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List detected wallet providers
    Providers,

    /// List UTXOs for an address and show which one would fund a transaction
    Utxos {
        /// Bitcoin address
        address: String,

        /// Minimum UTXO value in sats (overrides config)
        #[arg(long)]
        min_value: Option<u64>,
    },

    /// Check whether an output is still unspent
    CheckUtxo {
        /// Address that owns the output (selects the explorer)
        address: String,

        /// Output as txid:vout
        outpoint: String,
    },

    /// Show the recommended fee rate
    Fee,

    /// Private key utilities
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Inspect or forget the saved connection
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },

    /// Broadcast a signed PSBT or raw transaction
    Broadcast(BroadcastArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with defaults
    Init {
        /// Network: mainnet, testnet or regtest (default: mainnet)
        #[arg(short, long)]
        network: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Check the format of a private key (WIF or 64-char hex)
    Validate {
        /// Private key
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConnectionAction {
    /// Print the saved connection record
    Show,

    /// Erase the saved connection record
    Forget,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct BroadcastArgs {
    /// Signed PSBT, sent to the ORC backend
    #[arg(long)]
    pub psbt: Option<String>,

    /// Signed raw transaction hex, sent to Esplora
    #[arg(long)]
    pub raw: Option<String>,
}
