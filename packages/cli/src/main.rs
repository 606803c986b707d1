mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    catalog, compose, init, materialize, passcode, CatalogArgs, ComposeArgs, InitArgs,
    MaterializeArgs, PasscodeArgs,
};

/// Pitchcraft CLI - compose client letters from template catalogs
#[derive(Parser, Debug)]
#[command(name = "pitchcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pitchcraft project
    Init(InitArgs),

    /// Apply block operations to a catalog's base letter and print the draft
    Compose(ComposeArgs),

    /// Fill in every placeholder and print the letter to send
    Materialize(MaterializeArgs),

    /// Normalize an access code and print its checkout link
    Passcode(PasscodeArgs),

    /// Check a catalog file
    Catalog(CatalogArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Compose(args) => compose(args, &cwd),
        Command::Materialize(args) => materialize(args, &cwd),
        Command::Passcode(args) => passcode(args, &cwd),
        Command::Catalog(args) => catalog(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
