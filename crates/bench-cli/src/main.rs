//! # bench CLI entry point
//!
//! Parses command-line arguments, configures tracing from the verbosity
//! flag, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bench_cli::check::{run_check, CheckArgs};
use bench_cli::resolve::{run_resolve, ResolveArgs};

/// Benchmark schema negotiation.
///
/// Validates the Capabilities File a target publishes and resolves Enable
/// File run requests against it.
#[derive(Parser, Debug)]
#[command(name = "bench", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a Capabilities File and summarize what it declares.
    Check(CheckArgs),

    /// Negotiate an Enable File and print the resolved request as a re-loadable Enable File.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
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
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Resolve(args) => run_resolve(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
