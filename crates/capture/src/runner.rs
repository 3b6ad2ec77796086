//! Orchestration entry point: run the requested scenarios in a fixed order

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::CaptureConfig;
use crate::error::{AutomationError, AutomationResult};
use crate::scenario::{Scenario, ScenarioMode, Sequencer};
use crate::shot::Capture;

/// The failure that ended a run early
#[derive(Debug)]
pub struct RunFailure {
    /// Scenario that failed
    pub scenario: Scenario,
    /// What went wrong
    pub cause: AutomationError,
}

/// Aggregate of one invocation: the ordered captures gathered so far,
/// plus the failure that stopped the run, if any.
///
/// A failure does not discard earlier scenarios' captures — callers
/// decide whether partial results are acceptable.
#[derive(Debug)]
pub struct RunOutcome {
    pub captures: Vec<Capture>,
    pub failure: Option<RunFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_cancelled(&self) -> bool {
        self.failure
            .as_ref()
            .map(|f| f.cause.is_cancelled())
            .unwrap_or(false)
    }

    /// Paths of the produced artifacts, in capture order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.captures.iter().map(|c| c.path.clone()).collect()
    }
}

/// Runs a scenario set against one resolved configuration.
///
/// Scenarios execute strictly sequentially, each in its own session; a
/// failure aborts the whole run. There is deliberately no isolation or
/// continue-on-error: later scenarios may depend on state the failed one
/// was supposed to create.
pub struct Runner {
    sequencer: Sequencer,
}

impl Runner {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            sequencer: Sequencer::new(config),
        }
    }

    /// A runner whose steps observe an external cancellation signal.
    /// Cancellation surfaces as a distinct `Cancelled` failure cause.
    pub fn with_cancellation(config: CaptureConfig, cancel: CancellationToken) -> Self {
        Self {
            sequencer: Sequencer::with_cancellation(config, cancel),
        }
    }

    /// Run the scenarios selected by `mode` in their fixed order.
    pub async fn run(&self, mode: ScenarioMode) -> RunOutcome {
        let scenarios = mode.scenarios();
        info!("running {} scenario(s), mode={}", scenarios.len(), mode);

        let mut captures = Vec::new();
        for &scenario in scenarios {
            match self.sequencer.run_scenario(scenario).await {
                Ok(batch) => {
                    info!("scenario {} produced {} capture(s)", scenario, batch.len());
                    captures.extend(batch);
                }
                Err(cause) => {
                    error!("scenario {} failed: {}", scenario, cause);
                    return RunOutcome {
                        captures,
                        failure: Some(RunFailure { scenario, cause }),
                    };
                }
            }
        }

        info!("run complete: {} capture(s)", captures.len());
        RunOutcome {
            captures,
            failure: None,
        }
    }

    /// Write the ordered capture list as a JSON manifest for the
    /// document-assembly step.
    pub fn write_manifest(outcome: &RunOutcome, path: &Path) -> AutomationResult<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&outcome.captures)?;
        std::fs::write(path, json)?;
        info!("manifest written to {}", path.display());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(label: &str) -> Capture {
        Capture {
            label: label.to_string(),
            path: PathBuf::from(format!("/tmp/{}.png", label)),
        }
    }

    #[test]
    fn test_outcome_classification() {
        let ok = RunOutcome {
            captures: vec![shot("home")],
            failure: None,
        };
        assert!(ok.is_success());
        assert!(!ok.is_cancelled());

        let cancelled = RunOutcome {
            captures: vec![],
            failure: Some(RunFailure {
                scenario: Scenario::Login,
                cause: AutomationError::Cancelled,
            }),
        };
        assert!(!cancelled.is_success());
        assert!(cancelled.is_cancelled());
    }

    #[test]
    fn test_paths_preserve_capture_order() {
        let outcome = RunOutcome {
            captures: vec![shot("home"), shot("form-filled")],
            failure: None,
        };
        assert_eq!(
            outcome.paths(),
            vec![
                PathBuf::from("/tmp/home.png"),
                PathBuf::from("/tmp/form-filled.png"),
            ]
        );
    }

    #[test]
    fn test_write_manifest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.json");
        let outcome = RunOutcome {
            captures: vec![shot("home")],
            failure: None,
        };

        Runner::write_manifest(&outcome, &manifest_path).unwrap();

        let content = std::fs::read_to_string(&manifest_path).unwrap();
        let parsed: Vec<Capture> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, outcome.captures);
    }
}
