//! htmlbuild CLI - HTML directive preprocessor.
//!
//! Provides commands for:
//! - `build`: Rewrite configured HTML files and persist the build plan
//! - `scan`: List the directive blocks found in one file

mod batch;
mod commands;
mod error;
mod output;
mod plan_file;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ScanArgs};
use output::Output;

/// htmlbuild - HTML directive preprocessor.
#[derive(Parser)]
#[command(name = "htmlbuild", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process configured HTML files and write the build plan.
    Build(BuildArgs),
    /// List directive blocks in a file without changing it.
    Scan(ScanArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Scan(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
