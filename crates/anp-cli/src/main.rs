//! # anp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anp_cli::call::{run_call, CallArgs};
use anp_cli::describe::{run_describe, DescribeArgs};
use anp_cli::keygen::{run_keygen, KeygenArgs};

/// ANP agent CLI
///
/// Generate did:wba identities, fetch agent descriptions, and invoke
/// JSON-RPC methods through the DID-WBA handshake.
#[derive(Parser, Debug)]
#[command(name = "anp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a did:wba identity (Ed25519 keypair + DID document).
    Keygen(KeygenArgs),

    /// Fetch an agent description document.
    Describe(DescribeArgs),

    /// Invoke a JSON-RPC method on an agent.
    Call(CallArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Describe(args) => run_describe(&args).await,
        Commands::Call(args) => run_call(&args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
