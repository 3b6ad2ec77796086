//! The chained "full process": documents, server, captures, teardown

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use entrega_capture::{CapturePlan, Runner, ScenarioMode};

use crate::error::{PipelineError, PipelineResult};
use crate::generator::{DocumentGenerator, GenerateRequest, GeneratorConfig};
use crate::relocate::move_files;
use crate::server::{AppServer, AppServerConfig};

/// Final relocation of produced artifacts into a delivery directory
#[derive(Debug, Clone)]
pub struct CollectStep {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Options for one full delivery run
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Submitter's full name
    pub name: String,

    /// Delivery identifier
    pub delivery: String,

    /// Backend source tree (also where the app server runs)
    pub backend_dir: PathBuf,

    /// Frontend source tree
    pub frontend_dir: PathBuf,

    /// Where generated documents land
    pub output_dir: PathBuf,

    /// Capture plan; its base URL defaults to the server's
    pub capture: CapturePlan,

    /// External generator configuration
    pub generator: GeneratorConfig,

    /// Application server configuration
    pub server: AppServerConfig,

    /// Optional final relocation step
    pub collect: Option<CollectStep>,
}

impl ProcessOptions {
    pub fn new(
        name: impl Into<String>,
        delivery: impl Into<String>,
        backend_dir: PathBuf,
        frontend_dir: PathBuf,
    ) -> Self {
        let server = AppServerConfig {
            workdir: backend_dir.clone(),
            ..Default::default()
        };
        Self {
            name: name.into(),
            delivery: delivery.into(),
            backend_dir,
            frontend_dir,
            output_dir: PathBuf::from("delivery-files"),
            capture: CapturePlan::default(),
            generator: GeneratorConfig::default(),
            server,
            collect: None,
        }
    }
}

/// Record of one completed pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub detail: String,
}

/// Step-by-step account of a full-process run
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub steps: Vec<StepRecord>,
    pub success: bool,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl ProcessReport {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            success: false,
            error: None,
            finished_at: Utc::now(),
        }
    }

    fn step(&mut self, step: &str, detail: impl Into<String>) {
        let detail = detail.into();
        info!("step {} done: {}", step, detail);
        self.steps.push(StepRecord {
            step: step.to_string(),
            detail,
        });
    }

    fn fail(mut self, step: &str, err: impl std::fmt::Display) -> Self {
        error!("step {} failed: {}", step, err);
        self.error = Some(format!("{}: {}", step, err));
        self.finished_at = Utc::now();
        self
    }

    fn finish(mut self) -> Self {
        self.success = true;
        self.finished_at = Utc::now();
        self
    }
}

/// Run the whole delivery process.
///
/// Order: backend docs → frontend docs → app server up → captures →
/// screenshot document → server down → optional relocation. The first
/// failed step aborts the remainder, except the server teardown, which
/// runs no matter how the capture phase ends.
pub async fn run_full_process(options: ProcessOptions) -> ProcessReport {
    let mut report = ProcessReport::new();
    info!(
        "starting full delivery process for {} (delivery {})",
        options.name, options.delivery
    );

    if let Err(e) = std::fs::create_dir_all(&options.output_dir) {
        return report.fail("prepare", e);
    }

    let generator = DocumentGenerator::new(options.generator.clone());

    let backend_request = GenerateRequest {
        name: options.name.clone(),
        delivery: options.delivery.clone(),
        include_dirs: vec![options.backend_dir.clone()],
        output: "back-end".to_string(),
        include_env: false,
    };
    match generator.generate(&backend_request).await {
        Ok(out) => report.step("backend-docs", out.description),
        Err(e) => return report.fail("backend-docs", e),
    }

    let frontend_request = GenerateRequest {
        include_dirs: vec![options.frontend_dir.clone()],
        output: "front-end".to_string(),
        ..backend_request
    };
    match generator.generate(&frontend_request).await {
        Ok(out) => report.step("frontend-docs", out.description),
        Err(e) => return report.fail("frontend-docs", e),
    }

    let mut server = match AppServer::spawn(options.server.clone()).await {
        Ok(server) => {
            report.step("server-start", server.base_url().to_string());
            server
        }
        Err(e) => return report.fail("server-start", e),
    };

    // Teardown is owed to the server whatever happens in here.
    let captured = capture_and_document(&options, &generator, &mut report).await;
    server.stop().await;
    report.step("server-stop", "stopped");

    if let Err(e) = captured {
        return report.fail("captures", e);
    }

    if let Some(collect) = &options.collect {
        match move_files(&collect.source, &collect.dest, None) {
            Ok(move_report) => report.step("collect", move_report.summary()),
            Err(e) => return report.fail("collect", e),
        }
    }

    info!("full delivery process finished");
    report.finish()
}

async fn capture_and_document(
    options: &ProcessOptions,
    generator: &DocumentGenerator,
    report: &mut ProcessReport,
) -> PipelineResult<()> {
    let mut plan = options.capture.clone();
    plan.base_url
        .get_or_insert_with(|| options.server.base_url.clone());

    let runner = Runner::new(plan.resolve());
    let outcome = runner.run(ScenarioMode::All).await;
    if let Some(failure) = outcome.failure {
        return Err(PipelineError::Capture {
            scenario: failure.scenario.to_string(),
            cause: failure.cause.to_string(),
        });
    }
    report.step("captures", format!("{} screenshot(s)", outcome.captures.len()));

    let output = generator
        .document_captures(
            &options.name,
            &options.delivery,
            &outcome.paths(),
            &options.output_dir.join("screenshots"),
        )
        .await?;
    report.step("screenshots-doc", output.description);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_run_the_server_in_the_backend_dir() {
        let options = ProcessOptions::new(
            "João Arrocha",
            "3",
            PathBuf::from("/work/backend"),
            PathBuf::from("/work/frontend"),
        );
        assert_eq!(options.server.workdir, PathBuf::from("/work/backend"));
        assert_eq!(options.output_dir, PathBuf::from("delivery-files"));
        assert!(options.collect.is_none());
    }

    #[test]
    fn test_report_serializes_steps_in_order() {
        let mut report = ProcessReport::new();
        report.step("backend-docs", "ok");
        report.step("server-start", "http://localhost:3000");
        let report = report.finish();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["steps"][0]["step"], "backend-docs");
        assert_eq!(json["steps"][1]["step"], "server-start");
    }

    #[tokio::test]
    async fn test_missing_backend_dir_fails_the_first_step() {
        let out = tempfile::tempdir().unwrap();
        let mut options = ProcessOptions::new(
            "João Arrocha",
            "3",
            PathBuf::from("/definitely/not/here"),
            PathBuf::from("/also/not/here"),
        );
        options.output_dir = out.path().to_path_buf();

        let report = run_full_process(options).await;

        assert!(!report.success);
        assert!(report.steps.is_empty());
        assert!(report.error.as_deref().unwrap().starts_with("backend-docs:"));
    }
}
