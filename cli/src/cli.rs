use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(name = "register-dapp")]
#[command(bin_name = "register-dapp")]
#[command(about = "Deploy and use the register allow-list contract")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy the register contract with its fixed capacity.
    Deploy,
    /// Connect the wallet and show the register page.
    Page(SessionOptions),
    /// Connect the wallet and join the register.
    Join(SessionOptions),
    /// Print the register contract's JSON ABI.
    Abi(AbiArgs),
    /// Generate shell completion scripts.
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SessionOptions {
    /// Configuration file (defaults to ./register-dapp.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AbiArgs {
    /// Pretty-print the JSON.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
