//! `entrega capture` - run the screenshot scenarios

use std::path::PathBuf;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use entrega_capture::{CapturePlan, Runner, ScenarioMode};

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Base URL of the target application [default: http://localhost:3000]
    #[arg(long)]
    base_url: Option<String>,

    /// Persona selected in the registration dropdown [default: Maestro]
    #[arg(long)]
    persona: Option<String>,

    /// Scenario subset: login, invalid-submission, valid-registration, all
    #[arg(long, default_value = "all")]
    mode: ScenarioMode,

    /// Directory screenshots are written to [default: screenshots]
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// YAML capture plan; command-line flags override its values
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Primary form field override (repeatable)
    #[arg(long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Per-wait timeout in milliseconds [default: 30000]
    #[arg(long)]
    wait_timeout_ms: Option<u64>,

    /// Write the ordered capture list as JSON to this path
    #[arg(long)]
    manifest: Option<PathBuf>,
}

pub async fn run(args: CaptureArgs) -> anyhow::Result<bool> {
    let mut plan = match &args.plan {
        Some(path) => CapturePlan::from_file(path)?,
        None => CapturePlan::default(),
    };

    if let Some(url) = args.base_url {
        plan.base_url = Some(url);
    }
    if let Some(persona) = args.persona {
        plan.persona = Some(persona);
    }
    if let Some(dir) = args.screenshot_dir {
        plan.screenshot_dir = Some(dir);
    }
    if let Some(ms) = args.wait_timeout_ms {
        plan.wait_timeout_ms = Some(ms);
    }
    if args.headed {
        plan.headless = Some(false);
    }
    for field in &args.fields {
        let (name, value) = parse_field(field)?;
        plan.form.insert(name, value);
    }

    // Ctrl-C cancels between steps rather than killing the browser cold.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping after the current step");
                cancel.cancel();
            }
        });
    }

    let runner = Runner::with_cancellation(plan.resolve(), cancel);
    let outcome = runner.run(args.mode).await;

    for capture in &outcome.captures {
        println!("{}", capture.path.display());
    }
    if let Some(path) = &args.manifest {
        Runner::write_manifest(&outcome, path)?;
    }

    match &outcome.failure {
        None => Ok(true),
        Some(failure) if failure.cause.is_cancelled() => {
            warn!("run cancelled during scenario {}", failure.scenario);
            Ok(false)
        }
        Some(failure) => {
            error!("scenario {} failed: {}", failure.scenario, failure.cause);
            Ok(false)
        }
    }
}

fn parse_field(input: &str) -> anyhow::Result<(String, String)> {
    input
        .split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| anyhow::anyhow!("expected NAME=VALUE, got '{}'", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("email=a@b.com").unwrap(),
            ("email".to_string(), "a@b.com".to_string())
        );
        // Values may themselves contain '='
        assert_eq!(
            parse_field("answer=x=y").unwrap(),
            ("answer".to_string(), "x=y".to_string())
        );
        assert!(parse_field("no-separator").is_err());
    }
}
