//! Capture plans and their resolution into an immutable configuration

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AutomationResult;

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_persona() -> String {
    "Maestro".to_string()
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

/// Caller-facing capture plan parsed from YAML or assembled by the caller.
///
/// Every field is optional; omitted fields fall back to the built-in
/// defaults when the plan is resolved. Resolution happens exactly once —
/// the resulting [`CaptureConfig`] is read-only for the rest of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapturePlan {
    /// Base URL of the target application
    #[serde(default)]
    pub base_url: Option<String>,

    /// Persona selected in the registration dropdown
    #[serde(default)]
    pub persona: Option<String>,

    /// Directory screenshots are written to
    #[serde(default)]
    pub screenshot_dir: Option<PathBuf>,

    /// Primary form field overrides (field name -> value)
    #[serde(default)]
    pub form: HashMap<String, String>,

    /// Persona-specific fields, in screen order; replaces the default
    /// sequence entirely when present
    #[serde(default)]
    pub specific: Option<Vec<SpecificField>>,

    /// Per-wait timeout in milliseconds
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,

    /// Navigation settle timeout in milliseconds
    #[serde(default)]
    pub navigation_timeout_ms: Option<u64>,

    /// Run the browser headless (default) or with a visible window
    #[serde(default)]
    pub headless: Option<bool>,
}

impl CapturePlan {
    /// Parse a plan from a YAML string
    pub fn from_yaml(yaml: &str) -> AutomationResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a plan from a YAML file
    pub fn from_file(path: &Path) -> AutomationResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Resolve the plan against the built-in defaults.
    pub fn resolve(self) -> CaptureConfig {
        let mut form = FormFields::default();
        form.apply_overrides(&self.form);

        CaptureConfig {
            base_url: self.base_url.unwrap_or_else(default_base_url),
            persona: self.persona.unwrap_or_else(default_persona),
            screenshot_dir: self.screenshot_dir.unwrap_or_else(default_screenshot_dir),
            form,
            specific: self.specific.unwrap_or_else(SpecificField::default_sequence),
            wait_timeout: Duration::from_millis(self.wait_timeout_ms.unwrap_or(30_000)),
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms.unwrap_or(30_000)),
            settle_delay: Duration::from_millis(100),
            finish_delay: Duration::from_secs(2),
            headless: self.headless.unwrap_or(true),
        }
    }
}

/// How a persona-specific field is entered on the post-confirmation screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Picked from one of the page's dropdown controls, in document order
    Dropdown,
    /// Typed into a masked numeric input addressed by name
    Text,
}

/// One persona-specific field (name, value, and how it is entered)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificField {
    pub name: String,
    pub value: String,
    pub kind: FieldKind,
}

impl SpecificField {
    pub fn dropdown(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind: FieldKind::Dropdown,
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind: FieldKind::Text,
        }
    }

    /// The default specific-field sequence for the default persona.
    /// Order matters: dropdown-kind entries are matched positionally
    /// against the dropdown controls found on the page.
    pub fn default_sequence() -> Vec<Self> {
        vec![
            Self::dropdown("style", "Elegant"),
            Self::dropdown("origin", "Brazilian"),
            Self::text("years_experience", "20"),
        ]
    }
}

/// Primary registration form values, one per input, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
    pub question: String,
    pub answer: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            cpf: "123.456.719-49".to_string(),
            name: "João Arrocha".to_string(),
            email: "joaoomaestro@gmail.com".to_string(),
            password: "senha123".to_string(),
            confirmation: "senha123".to_string(),
            question: "Qual o nome do seu primeiro pet?".to_string(),
            answer: "Rex".to_string(),
        }
    }
}

impl FormFields {
    /// Deliberately broken values used by the invalid-submission scenario:
    /// empty name, email without a domain, mismatched confirmation.
    pub fn invalid() -> Self {
        Self {
            cpf: "163.456.789-40".to_string(),
            name: String::new(),
            email: "joaoomaestr".to_string(),
            password: "senha123".to_string(),
            confirmation: "senha1323".to_string(),
            question: "Qual o nome do seu primeiro pet?".to_string(),
            answer: "Rex".to_string(),
        }
    }

    /// Field name / value pairs in the order they appear on screen.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("cpf", self.cpf.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("confirmation", self.confirmation.as_str()),
            ("question", self.question.as_str()),
            ("answer", self.answer.as_str()),
        ]
    }

    fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            match key.as_str() {
                "cpf" => self.cpf = value.clone(),
                "name" => self.name = value.clone(),
                "email" => self.email = value.clone(),
                "password" => self.password = value.clone(),
                "confirmation" => self.confirmation = value.clone(),
                "question" => self.question = value.clone(),
                "answer" => self.answer = value.clone(),
                other => warn!("ignoring unknown form field override: {}", other),
            }
        }
    }
}

/// Fully resolved, immutable configuration for one capture invocation
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub base_url: String,
    pub persona: String,
    pub screenshot_dir: PathBuf,
    pub form: FormFields,
    pub specific: Vec<SpecificField>,
    pub wait_timeout: Duration,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub finish_delay: Duration,
    pub headless: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CapturePlan::default().resolve()
    }
}

impl CaptureConfig {
    /// URL of the registration form screen
    pub fn registration_url(&self) -> String {
        format!("{}/create-user", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = CapturePlan::default().resolve();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.persona, "Maestro");
        assert_eq!(config.form.cpf, "123.456.719-49");
        assert_eq!(config.specific.len(), 3);
        assert_eq!(config.wait_timeout, Duration::from_secs(30));
        assert!(config.headless);
    }

    #[test]
    fn test_override_wins_and_unset_defaults_are_retained() {
        let mut plan = CapturePlan::default();
        plan.form.insert("email".to_string(), "someone@example.com".to_string());
        plan.form.insert("unknown_field".to_string(), "x".to_string());

        let config = plan.resolve();
        assert_eq!(config.form.email, "someone@example.com");
        // Unspecified fields keep their defaults
        assert_eq!(config.form.name, "João Arrocha");
        assert_eq!(config.form.password, "senha123");
    }

    #[test]
    fn test_entries_are_in_document_order() {
        let names: Vec<&str> = FormFields::default()
            .entries()
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            names,
            ["cpf", "name", "email", "password", "confirmation", "question", "answer"]
        );
    }

    #[test]
    fn test_invalid_fields_break_validation() {
        let invalid = FormFields::invalid();
        assert!(invalid.name.is_empty());
        assert!(!invalid.email.contains('@'));
        assert_ne!(invalid.password, invalid.confirmation);
    }

    #[test]
    fn test_registration_url_handles_trailing_slash() {
        let plan = CapturePlan {
            base_url: Some("http://localhost:3000/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan.resolve().registration_url(),
            "http://localhost:3000/create-user"
        );
    }

    #[test]
    fn test_parse_plan_from_yaml() {
        let yaml = r#"
base_url: http://127.0.0.1:8080
persona: Musician
form:
  email: musician@example.com
specific:
  - name: style
    value: Classical
    kind: dropdown
  - name: years_experience
    value: "5"
    kind: text
wait_timeout_ms: 10000
headless: false
"#;
        let config = CapturePlan::from_yaml(yaml).unwrap().resolve();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.persona, "Musician");
        assert_eq!(config.form.email, "musician@example.com");
        assert_eq!(config.specific.len(), 2);
        assert_eq!(config.specific[0].kind, FieldKind::Dropdown);
        assert_eq!(config.specific[1].kind, FieldKind::Text);
        assert_eq!(config.wait_timeout, Duration::from_secs(10));
        assert!(!config.headless);
    }
}
