//! entrega CLI - Main Entry Point
//!
//! Command-line front end for the delivery automation toolkit:
//! workflow screenshot capture, document generation, file relocation,
//! and the chained full delivery process.

use clap::{Parser, Subcommand};

mod commands;

use commands::{capture, deliver, files, generate};

/// Delivery automation: generated documents and workflow screenshots
#[derive(Parser)]
#[command(name = "entrega")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture workflow screenshots from the target application
    Capture(capture::CaptureArgs),

    /// Generate a source-tree document via the external generator
    Generate(generate::GenerateArgs),

    /// Move produced files into a delivery directory
    MoveFiles(files::MoveArgs),

    /// Run the whole delivery process end to end
    Deliver(deliver::DeliverArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Capture(args) => capture::run(args).await,
        Commands::Generate(args) => generate::run(args).await,
        Commands::MoveFiles(args) => files::run(args),
        Commands::Deliver(args) => deliver::run(args).await,
    };

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
