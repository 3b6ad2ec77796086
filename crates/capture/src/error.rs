//! Error types for the capture engine

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`AutomationError`]
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Failures surfaced by the capture engine
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("dropdown option not found: '{label}'")]
    OptionNotFound { label: String },

    #[error("timed out after {}ms waiting for {what}", .timeout.as_millis())]
    Timeout { what: String, timeout: Duration },

    #[error("capture '{label}' failed: {reason}")]
    Capture { label: String, reason: String },

    #[error("run cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutomationError {
    /// Whether this failure came from an external cancellation signal
    /// rather than the automation itself going wrong.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AutomationError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_includes_millis() {
        let err = AutomationError::Timeout {
            what: "selector '.p-dropdown'".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 30000ms waiting for selector '.p-dropdown'"
        );
    }

    #[test]
    fn test_cancelled_classification() {
        assert!(AutomationError::Cancelled.is_cancelled());
        assert!(!AutomationError::OptionNotFound { label: "Elegant".into() }.is_cancelled());
    }
}
