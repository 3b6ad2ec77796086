//! Scenario sequencing: named capture flows over a live session
//!
//! A scenario is a fixed sequence of (interaction, capture) pairs. Each
//! scenario opens its own browser session and closes it on every exit
//! path; a failed step aborts the scenario and its partial captures are
//! dropped by the caller's error path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions::{self, selectors, WaitOptions};
use crate::config::{CaptureConfig, FieldKind, FormFields, SpecificField};
use crate::error::{AutomationError, AutomationResult};
use crate::session::{Session, SessionOptions};
use crate::shot::{capture, Capture};

/// Fixed capture labels (the artifact naming contract consumed by the
/// document-assembly step)
pub mod labels {
    pub const HOME: &str = "home";
    pub const SUBMISSION_WITH_ERRORS: &str = "submission-with-errors";
    pub const FORM_FILLED: &str = "form-filled";
    pub const CONFIRM: &str = "confirm";
    pub const SPECIFIC_DATA_FILLED: &str = "specific-data-filled";
    pub const REGISTRATION_COMPLETE: &str = "registration-complete";
}

/// Button labels in the target UI
pub mod buttons {
    pub const SAVE: &str = "Save";
    /// The finishing screen is reused for create and edit, so the final
    /// button reads either way.
    pub const FINISHERS: &[&str] = &["Register", "Update"];
}

/// Shrink the page so the confirmation modal and its backdrop both fit
/// into the capture.
const ZOOM_OUT_JS: &str = "document.body.style.zoom = '0.65'";

/// A named capture flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Snapshot of the login page
    Login,
    /// Submit the registration form with broken values to show the
    /// validation-error state
    InvalidSubmission,
    /// Full registration: form, confirmation modal, persona-specific
    /// data, finish
    ValidRegistration,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Login => "login",
            Scenario::InvalidSubmission => "invalid-submission",
            Scenario::ValidRegistration => "valid-registration",
        }
    }

    /// The labels this scenario captures, in step order.
    pub fn capture_labels(&self) -> &'static [&'static str] {
        match self {
            Scenario::Login => &[labels::HOME],
            Scenario::InvalidSubmission => &[labels::SUBMISSION_WITH_ERRORS],
            Scenario::ValidRegistration => &[
                labels::FORM_FILLED,
                labels::CONFIRM,
                labels::SPECIFIC_DATA_FILLED,
                labels::REGISTRATION_COMPLETE,
            ],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which scenarios one invocation runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioMode {
    Login,
    InvalidSubmission,
    ValidRegistration,
    #[default]
    All,
}

impl ScenarioMode {
    /// Scenarios for this mode, in execution order.
    ///
    /// `All` runs registration before anything that could depend on an
    /// account already existing.
    pub fn scenarios(self) -> &'static [Scenario] {
        match self {
            ScenarioMode::Login => &[Scenario::Login],
            ScenarioMode::InvalidSubmission => &[Scenario::InvalidSubmission],
            ScenarioMode::ValidRegistration => &[Scenario::ValidRegistration],
            ScenarioMode::All => &[
                Scenario::Login,
                Scenario::ValidRegistration,
                Scenario::InvalidSubmission,
            ],
        }
    }
}

impl FromStr for ScenarioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(ScenarioMode::Login),
            "invalid-submission" => Ok(ScenarioMode::InvalidSubmission),
            "valid-registration" => Ok(ScenarioMode::ValidRegistration),
            "all" => Ok(ScenarioMode::All),
            other => Err(format!(
                "unknown mode '{}' (expected login, invalid-submission, valid-registration or all)",
                other
            )),
        }
    }
}

impl fmt::Display for ScenarioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioMode::Login => "login",
            ScenarioMode::InvalidSubmission => "invalid-submission",
            ScenarioMode::ValidRegistration => "valid-registration",
            ScenarioMode::All => "all",
        };
        f.write_str(name)
    }
}

/// Where a planned specific field lands on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTarget {
    /// The nth dropdown control on the page, in document order
    Dropdown { slot: usize },
    /// A masked numeric input addressed by name
    MaskedInput { selector: String },
}

/// A specific field resolved to its concrete target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedField {
    pub name: String,
    pub value: String,
    pub target: PlannedTarget,
}

/// Resolve the ordered specific-field sequence into concrete targets.
///
/// Dropdown-kind entries consume positional dropdown slots left to right;
/// text-kind entries do not advance the slot counter. The screen layout
/// depends on this exact consumption order.
pub fn plan_specific_fields(fields: &[SpecificField]) -> Vec<PlannedField> {
    let mut slot = 0;
    fields
        .iter()
        .map(|field| {
            let target = match field.kind {
                FieldKind::Dropdown => {
                    let target = PlannedTarget::Dropdown { slot };
                    slot += 1;
                    target
                }
                FieldKind::Text => PlannedTarget::MaskedInput {
                    selector: selectors::input_named(&field.name),
                },
            };
            PlannedField {
                name: field.name.clone(),
                value: field.value.clone(),
                target,
            }
        })
        .collect()
}

/// Runs scenarios against the resolved configuration.
pub struct Sequencer {
    config: CaptureConfig,
    cancel: CancellationToken,
}

impl Sequencer {
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    pub fn with_cancellation(config: CaptureConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Run one scenario in a fresh session.
    ///
    /// The session is closed on success and failure alike; a failed step
    /// surfaces its error with no partial captures.
    pub async fn run_scenario(&self, scenario: Scenario) -> AutomationResult<Vec<Capture>> {
        self.checkpoint()?;
        info!("running scenario: {}", scenario);

        let url = match scenario {
            Scenario::Login => self.config.base_url.clone(),
            Scenario::InvalidSubmission | Scenario::ValidRegistration => {
                self.config.registration_url()
            }
        };

        let session = Session::open(&url, &self.session_options()).await?;
        let result = match scenario {
            Scenario::Login => self.drive_login(&session).await,
            Scenario::InvalidSubmission => self.drive_invalid_submission(&session).await,
            Scenario::ValidRegistration => self.drive_valid_registration(&session).await,
        };
        session.close().await;
        result
    }

    async fn drive_login(&self, session: &Session) -> AutomationResult<Vec<Capture>> {
        let shot = capture(session.page(), &self.config.screenshot_dir, labels::HOME).await?;
        Ok(vec![shot])
    }

    async fn drive_invalid_submission(&self, session: &Session) -> AutomationResult<Vec<Capture>> {
        let page = session.page();
        let wait = self.wait();

        actions::select_dropdown_option(page, selectors::DROPDOWN, &self.config.persona, &wait)
            .await?;
        for (name, value) in FormFields::invalid().entries() {
            self.checkpoint()?;
            actions::type_into_field(page, &selectors::input_named(name), value, &wait).await?;
        }
        self.settle().await;

        actions::click_by_text(page, buttons::SAVE, None, &wait).await?;
        self.settle().await;

        let shot = capture(
            page,
            &self.config.screenshot_dir,
            labels::SUBMISSION_WITH_ERRORS,
        )
        .await?;
        Ok(vec![shot])
    }

    /// The registration state machine:
    /// FormOpen → FormFilled → ConfirmationShown → ConfirmationAccepted
    /// → SpecificDataFilled → Submitted. Strictly sequential; the first
    /// failed transition aborts the scenario.
    async fn drive_valid_registration(&self, session: &Session) -> AutomationResult<Vec<Capture>> {
        let page = session.page();
        let wait = self.wait();
        let dir = &self.config.screenshot_dir;
        let mut captures = Vec::new();

        // FormOpen → FormFilled
        actions::select_dropdown_option(page, selectors::DROPDOWN, &self.config.persona, &wait)
            .await?;
        for (name, value) in self.config.form.entries() {
            self.checkpoint()?;
            actions::type_into_field(page, &selectors::input_named(name), value, &wait).await?;
        }
        self.settle().await;
        captures.push(capture(page, dir, labels::FORM_FILLED).await?);

        // FormFilled → ConfirmationShown
        self.checkpoint()?;
        actions::click_by_text(page, buttons::SAVE, None, &wait).await?;
        actions::wait_for_selector(page, selectors::MODAL, &wait).await?;
        self.settle().await;
        page.evaluate(ZOOM_OUT_JS).await?;
        self.settle().await;
        captures.push(capture(page, dir, labels::CONFIRM).await?);

        // ConfirmationShown → ConfirmationAccepted: the modal has its own
        // Save button, so the click is scoped to it.
        self.checkpoint()?;
        actions::click_by_text(page, buttons::SAVE, Some(selectors::MODAL), &wait).await?;
        self.settle().await;

        // ConfirmationAccepted → SpecificDataFilled
        let planned = plan_specific_fields(&self.config.specific);
        if planned
            .iter()
            .any(|f| matches!(f.target, PlannedTarget::Dropdown { .. }))
        {
            actions::wait_for_selector(page, selectors::DROPDOWN, &wait).await?;
        }
        let dropdowns = page
            .find_elements(selectors::DROPDOWN)
            .await
            .unwrap_or_default();
        for field in &planned {
            self.checkpoint()?;
            match &field.target {
                PlannedTarget::Dropdown { slot } => {
                    let control = dropdowns.get(*slot).ok_or_else(|| {
                        AutomationError::ElementNotFound(format!(
                            "dropdown #{} for field '{}'",
                            slot + 1,
                            field.name
                        ))
                    })?;
                    actions::pick_dropdown_option(page, control, &field.value, &wait).await?;
                }
                PlannedTarget::MaskedInput { selector } => {
                    actions::type_into_masked_field(page, selector, &field.value, &wait).await?;
                }
            }
            self.settle().await;
        }
        captures.push(capture(page, dir, labels::SPECIFIC_DATA_FILLED).await?);

        // SpecificDataFilled → Submitted
        self.checkpoint()?;
        tokio::time::sleep(self.config.finish_delay).await;
        actions::click_by_any_text(page, buttons::FINISHERS, None, &wait).await?;
        self.settle().await;
        captures.push(capture(page, dir, labels::REGISTRATION_COMPLETE).await?);

        Ok(captures)
    }

    fn wait(&self) -> WaitOptions {
        WaitOptions::with_timeout(self.config.wait_timeout)
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.config.headless,
            navigation_timeout: self.config.navigation_timeout,
            settle_delay: self.config.settle_delay,
            ..Default::default()
        }
    }

    /// Cancellation is checked between steps, never mid-wait.
    fn checkpoint(&self) -> AutomationResult<()> {
        if self.cancel.is_cancelled() {
            Err(AutomationError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn settle(&self) {
        tokio::time::sleep(self.config.settle_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_mode_runs_registration_before_invalid_submission() {
        assert_eq!(
            ScenarioMode::All.scenarios(),
            &[
                Scenario::Login,
                Scenario::ValidRegistration,
                Scenario::InvalidSubmission,
            ]
        );
    }

    #[test]
    fn test_single_modes_run_one_scenario() {
        assert_eq!(ScenarioMode::Login.scenarios(), &[Scenario::Login]);
        assert_eq!(
            ScenarioMode::ValidRegistration.scenarios(),
            &[Scenario::ValidRegistration]
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("all".parse::<ScenarioMode>().unwrap(), ScenarioMode::All);
        assert_eq!(
            "invalid-submission".parse::<ScenarioMode>().unwrap(),
            ScenarioMode::InvalidSubmission
        );
        assert!("screenshots".parse::<ScenarioMode>().is_err());
    }

    #[test]
    fn test_dropdown_fields_consume_slots_in_document_order() {
        let fields = vec![
            SpecificField::dropdown("style", "Elegant"),
            SpecificField::dropdown("origin", "Brazilian"),
            SpecificField::text("years_experience", "20"),
        ];
        let planned = plan_specific_fields(&fields);

        assert_eq!(planned[0].target, PlannedTarget::Dropdown { slot: 0 });
        assert_eq!(planned[1].target, PlannedTarget::Dropdown { slot: 1 });
        assert_eq!(
            planned[2].target,
            PlannedTarget::MaskedInput {
                selector: "input[name=\"years_experience\"]".to_string()
            }
        );
    }

    #[test]
    fn test_text_fields_do_not_advance_the_slot_counter() {
        let fields = vec![
            SpecificField::dropdown("style", "Elegant"),
            SpecificField::text("years_experience", "20"),
            SpecificField::dropdown("origin", "Brazilian"),
        ];
        let planned = plan_specific_fields(&fields);

        // The dropdown after the text field still takes slot 1, not 2.
        assert_eq!(planned[0].target, PlannedTarget::Dropdown { slot: 0 });
        assert_eq!(planned[2].target, PlannedTarget::Dropdown { slot: 1 });
    }

    #[test]
    fn test_scenario_capture_labels() {
        assert_eq!(Scenario::Login.capture_labels(), &[labels::HOME]);
        assert_eq!(
            Scenario::ValidRegistration.capture_labels(),
            &[
                labels::FORM_FILLED,
                labels::CONFIRM,
                labels::SPECIFIC_DATA_FILLED,
                labels::REGISTRATION_COMPLETE,
            ]
        );
    }
}
