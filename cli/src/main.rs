mod cli;
mod commands;
mod error;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(err) = run() {
        ui::error(err.to_string());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    ui::init_logging(cli.verbose);

    match cli.command {
        Commands::Deploy => commands::deploy::run(),
        Commands::Page(args) => commands::page::run(args),
        Commands::Join(args) => commands::join::run(args),
        Commands::Abi(args) => commands::abi::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
