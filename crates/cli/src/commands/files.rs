//! `entrega move-files` - relocate produced files

use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use entrega_pipeline::move_files;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Source directory
    #[arg(long)]
    source: PathBuf,

    /// Destination directory, created if absent
    #[arg(long)]
    dest: PathBuf,

    /// Move only this file (repeatable); default is every file in source
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
}

pub fn run(args: MoveArgs) -> anyhow::Result<bool> {
    let explicit = (!args.files.is_empty()).then_some(args.files.as_slice());
    let report = move_files(&args.source, &args.dest, explicit)?;

    println!("{}", report.summary());
    for failure in &report.failures {
        warn!("{}: {}", failure.file.display(), failure.reason);
    }

    Ok(report.is_clean())
}
