use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Args, Command};

use crate::{
    app,
    config::{BroadcastMode, Encoding, OutputFormat},
    tx::DEFAULT_GAS,
};

pub const FLAG_HOME: &str = "home";
pub const FLAG_CHAIN_ID: &str = "chain-id";
pub const FLAG_ENCODING: &str = "encoding";
pub const FLAG_OUTPUT: &str = "output";
pub const FLAG_NODE: &str = "node";
pub const FLAG_TRUST_NODE: &str = "trust-node";
pub const FLAG_INDENT: &str = "indent";
pub const FLAG_TRACE: &str = "trace";
pub const FLAG_BROADCAST_MODE: &str = "broadcast-mode";

pub const ENV_PREFIX: &str = "NS";
pub const DEFAULT_NODE: &str = "tcp://localhost:26657";

/// `chain-id` -> `NS_CHAIN_ID`
pub fn env_var(flag: &str) -> String {
    format!("{ENV_PREFIX}_{}", flag.to_uppercase().replace('-', "_"))
}

/// Persistent flags, visible on every subcommand and settable through `NS_*`.
pub fn with_global_flags(command: Command) -> Command {
    let home = app::default_cli_home().display().to_string();

    command
        .arg(
            Arg::new(FLAG_HOME)
                .long(FLAG_HOME)
                .global(true)
                .env(env_var(FLAG_HOME))
                .value_parser(value_parser!(PathBuf))
                .default_value(home)
                .help("Directory for config and data"),
        )
        .arg(
            Arg::new(FLAG_CHAIN_ID)
                .long(FLAG_CHAIN_ID)
                .global(true)
                .env(env_var(FLAG_CHAIN_ID))
                .default_value("")
                .help("Chain ID of tendermint node"),
        )
        .arg(
            Arg::new(FLAG_ENCODING)
                .long(FLAG_ENCODING)
                .short('e')
                .global(true)
                .env(env_var(FLAG_ENCODING))
                .value_parser(value_parser!(Encoding))
                .default_value("hex")
                .help("Binary encoding (hex|b64|btc)"),
        )
        .arg(
            Arg::new(FLAG_OUTPUT)
                .long(FLAG_OUTPUT)
                .short('o')
                .global(true)
                .env(env_var(FLAG_OUTPUT))
                .value_parser(value_parser!(OutputFormat))
                .default_value("text")
                .help("Output format (text|json)"),
        )
        .arg(
            Arg::new(FLAG_NODE)
                .long(FLAG_NODE)
                .global(true)
                .env(env_var(FLAG_NODE))
                .default_value(DEFAULT_NODE)
                .help("<host>:<port> to tendermint rpc interface for this chain"),
        )
        .arg(
            Arg::new(FLAG_TRUST_NODE)
                .long(FLAG_TRUST_NODE)
                .global(true)
                .env(env_var(FLAG_TRUST_NODE))
                .action(ArgAction::SetTrue)
                .help("Trust connected full node (don't verify proofs for responses)"),
        )
        .arg(
            Arg::new(FLAG_INDENT)
                .long(FLAG_INDENT)
                .global(true)
                .env(env_var(FLAG_INDENT))
                .action(ArgAction::SetTrue)
                .help("Add indent to JSON response"),
        )
        .arg(
            Arg::new(FLAG_TRACE)
                .long(FLAG_TRACE)
                .global(true)
                .env(env_var(FLAG_TRACE))
                .action(ArgAction::SetTrue)
                .help("Print out full error details on failure"),
        )
}

/// Account number and sequence, needed to sign without asking the node.
#[derive(Debug, Clone, Default, Args)]
pub struct AccountFlags {
    #[arg(long, help = "Offline mode; do not query a full node")]
    pub offline: bool,

    #[arg(long, help = "The account number of the signing account (offline mode only)")]
    pub account_number: Option<u64>,

    #[arg(long, help = "The sequence number of the signing account (offline mode only)")]
    pub sequence: Option<u64>,
}

/// Flags shared by every command that builds and sends a transaction.
#[derive(Debug, Clone, Args)]
pub struct TxFlags {
    #[arg(long, default_value_t = DEFAULT_GAS, help = "Gas limit to set per-transaction")]
    pub gas: u64,

    #[arg(long, default_value = "", help = "Fees to pay along with transaction; eg: 10stake")]
    pub fees: String,

    #[arg(long, default_value = "", help = "Memo to send along with transaction")]
    pub memo: String,

    #[arg(long, value_enum, help = "Transaction broadcasting mode (sync|async|block)")]
    pub broadcast_mode: Option<BroadcastMode>,

    #[arg(
        long,
        help = "Build an unsigned transaction and write it to STDOUT (when enabled, the local Keybase is not accessible)"
    )]
    pub generate_only: bool,

    #[command(flatten)]
    pub account: AccountFlags,
}
