//! `entrega generate` - invoke the external document generator

use std::path::PathBuf;

use clap::Args;
use tracing::error;

use entrega_pipeline::{DocumentGenerator, GenerateRequest, GeneratorConfig, PipelineError};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Submitter's full name
    #[arg(long)]
    name: String,

    /// Delivery identifier
    #[arg(long)]
    delivery: String,

    /// Source directory to include (repeatable)
    #[arg(long = "include-dir", value_name = "DIR", required = true)]
    include_dirs: Vec<PathBuf>,

    /// Output base filename, without extension
    #[arg(long)]
    output: String,

    /// Also include environment files
    #[arg(long)]
    include_env: bool,

    /// Interpreter the generator scripts run under
    #[arg(long)]
    interpreter: Option<String>,

    /// Path to the generator script
    #[arg(long)]
    script: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs) -> anyhow::Result<bool> {
    let mut config = GeneratorConfig::default();
    if let Some(interpreter) = args.interpreter {
        config.command = interpreter;
    }
    if let Some(script) = args.script {
        config.script = script;
    }

    let generator = DocumentGenerator::new(config);
    let request = GenerateRequest {
        name: args.name,
        delivery: args.delivery,
        include_dirs: args.include_dirs,
        output: args.output,
        include_env: args.include_env,
    };

    match generator.generate(&request).await {
        Ok(output) => {
            if !output.description.is_empty() {
                println!("{}", output.description);
            }
            Ok(true)
        }
        Err(e @ PipelineError::Generator { .. }) => {
            error!("{}", e);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
