//! `entrega deliver` - the chained full delivery process

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::error;

use entrega_pipeline::{run_full_process, ProcessOptions};

#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Submitter's full name
    #[arg(long)]
    name: String,

    /// Delivery identifier
    #[arg(long)]
    delivery: String,

    /// Backend source tree; the app server runs here
    #[arg(long)]
    backend_dir: PathBuf,

    /// Frontend source tree
    #[arg(long)]
    frontend_dir: PathBuf,

    /// Where generated documents land
    #[arg(long, default_value = "delivery-files")]
    output_dir: PathBuf,

    /// Base URL the app server answers on
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Persona used by the capture scenarios
    #[arg(long, default_value = "Maestro")]
    persona: String,

    /// Command that starts the app server
    #[arg(long, default_value = "yarn")]
    server_command: String,

    /// Argument for the server command (repeatable) [default: web]
    #[arg(long = "server-arg", value_name = "ARG")]
    server_args: Vec<String>,

    /// Server startup timeout in seconds
    #[arg(long, default_value = "30")]
    startup_timeout_secs: u64,

    /// Write the step report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

pub async fn run(args: DeliverArgs) -> anyhow::Result<bool> {
    let mut options = ProcessOptions::new(
        args.name,
        args.delivery,
        args.backend_dir,
        args.frontend_dir,
    );
    options.output_dir = args.output_dir;
    options.server.base_url = args.base_url.clone();
    options.server.command = args.server_command;
    if !args.server_args.is_empty() {
        options.server.args = args.server_args;
    }
    options.server.startup_timeout = Duration::from_secs(args.startup_timeout_secs);
    options.capture.base_url = Some(args.base_url);
    options.capture.persona = Some(args.persona);

    let report = run_full_process(options).await;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    for step in &report.steps {
        println!("✓ {}", step.step);
    }
    match &report.error {
        None => {
            println!("delivery process finished: {} step(s)", report.steps.len());
            Ok(true)
        }
        Some(err) => {
            error!("delivery process failed: {}", err);
            Ok(false)
        }
    }
}
