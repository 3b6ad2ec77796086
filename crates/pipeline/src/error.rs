//! Error types for the delivery pipeline

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`PipelineError`]
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures surfaced by the delivery pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("document generator exited with status {status}: {stderr}")]
    Generator { status: i32, stderr: String },

    #[error("no source directories were selected")]
    NoInputDirs,

    #[error("directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no captures were produced to document")]
    NoCaptures,

    #[error("application server failed to start: {0}")]
    ServerStartup(String),

    #[error("application server not ready after {}s", .0.as_secs())]
    ServerNotReady(Duration),

    #[error("capture run failed in scenario {scenario}: {cause}")]
    Capture { scenario: String, cause: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_error_carries_stderr() {
        let err = PipelineError::Generator {
            status: 2,
            stderr: "missing python-docx".to_string(),
        };
        assert!(err.to_string().contains("status 2"));
        assert!(err.to_string().contains("missing python-docx"));
    }
}
