//! Invocation of the external document-generator scripts
//!
//! The generators themselves are black boxes: exit code 0 means success
//! with a human-readable description on stdout, anything else is a
//! failure with diagnostics on stderr. Nothing here parses their output
//! beyond that contract.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};

fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// How to run the external generator scripts
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Interpreter the scripts run under
    pub command: String,

    /// Source-tree document generator
    pub script: PathBuf,

    /// Screenshot document generator
    pub screenshots_script: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_interpreter().to_string(),
            script: PathBuf::from("scripts/gerador.py"),
            screenshots_script: PathBuf::from("scripts/generate_screenshots_doc.py"),
        }
    }
}

/// One source-tree documentation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Submitter's full name
    pub name: String,
    /// Delivery identifier
    pub delivery: String,
    /// Source directories included in the document
    pub include_dirs: Vec<PathBuf>,
    /// Output base filename (no extension)
    pub output: String,
    /// Also include environment files
    pub include_env: bool,
}

/// Opaque success description taken from the generator's stdout
#[derive(Debug, Clone)]
pub struct GeneratorOutput {
    pub description: String,
}

/// Drives the external document generators
pub struct DocumentGenerator {
    config: GeneratorConfig,
}

impl DocumentGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate the source-tree document for `request`.
    ///
    /// Rejects an empty directory list and directories that do not exist
    /// before spawning anything.
    pub async fn generate(&self, request: &GenerateRequest) -> PipelineResult<GeneratorOutput> {
        if request.include_dirs.is_empty() {
            return Err(PipelineError::NoInputDirs);
        }
        for dir in &request.include_dirs {
            if !dir.is_dir() {
                return Err(PipelineError::DirNotFound(dir.clone()));
            }
        }

        self.run(source_args(&self.config.script, request)).await
    }

    /// Generate the screenshot document from an ordered capture list.
    ///
    /// The list is handed to the script through a temp file, removed when
    /// this call returns.
    pub async fn document_captures(
        &self,
        name: &str,
        delivery: &str,
        captures: &[PathBuf],
        output: &Path,
    ) -> PipelineResult<GeneratorOutput> {
        if captures.is_empty() {
            return Err(PipelineError::NoCaptures);
        }

        let list = captures
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let list_file = tempfile::NamedTempFile::new()?;
        std::fs::write(list_file.path(), list)?;

        let args = vec![
            self.config.screenshots_script.display().to_string(),
            "--name".to_string(),
            name.to_string(),
            "--delivery".to_string(),
            delivery.to_string(),
            "--screenshots-list".to_string(),
            list_file.path().display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ];

        // list_file is removed on drop, after the generator has exited.
        self.run(args).await
    }

    async fn run(&self, args: Vec<String>) -> PipelineResult<GeneratorOutput> {
        debug!("running generator: {} {:?}", self.config.command, args);

        let output = Command::new(&self.config.command)
            .args(&args)
            .output()
            .await?;

        if output.status.success() {
            let description = String::from_utf8_lossy(&output.stdout).trim().to_string();
            info!("generator finished");
            Ok(GeneratorOutput { description })
        } else {
            Err(PipelineError::Generator {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

fn source_args(script: &Path, request: &GenerateRequest) -> Vec<String> {
    let dirs = request
        .include_dirs
        .iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut args = vec![
        script.display().to_string(),
        "--name".to_string(),
        request.name.clone(),
        "--delivery".to_string(),
        request.delivery.clone(),
        "--include-dirs".to_string(),
        dirs,
        "--output".to_string(),
        request.output.clone(),
    ];
    if request.include_env {
        args.push("--include-env".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerateRequest {
        GenerateRequest {
            name: "João Arrocha".to_string(),
            delivery: "3".to_string(),
            include_dirs: vec![PathBuf::from("/work/backend"), PathBuf::from("/work/frontend")],
            output: "back-end".to_string(),
            include_env: false,
        }
    }

    #[test]
    fn test_source_args_join_dirs_with_commas() {
        let args = source_args(Path::new("scripts/gerador.py"), &request());
        assert_eq!(
            args,
            [
                "scripts/gerador.py",
                "--name",
                "João Arrocha",
                "--delivery",
                "3",
                "--include-dirs",
                "/work/backend,/work/frontend",
                "--output",
                "back-end",
            ]
        );
    }

    #[test]
    fn test_include_env_appends_flag() {
        let mut req = request();
        req.include_env = true;
        let args = source_args(Path::new("scripts/gerador.py"), &req);
        assert_eq!(args.last().map(String::as_str), Some("--include-env"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_dir_list() {
        let generator = DocumentGenerator::new(GeneratorConfig::default());
        let mut req = request();
        req.include_dirs.clear();

        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoInputDirs));
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_dir() {
        let generator = DocumentGenerator::new(GeneratorConfig::default());
        let mut req = request();
        req.include_dirs = vec![PathBuf::from("/definitely/not/here")];

        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, PipelineError::DirNotFound(_)));
    }

    #[tokio::test]
    async fn test_document_captures_rejects_empty_list() {
        let generator = DocumentGenerator::new(GeneratorConfig::default());
        let err = generator
            .document_captures("João", "3", &[], Path::new("out/screenshots"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCaptures));
    }
}
