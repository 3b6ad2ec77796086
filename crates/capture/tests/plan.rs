//! Properties of the capture plan layer that hold without a live browser

use entrega_capture::scenario::{labels, plan_specific_fields, PlannedTarget};
use entrega_capture::{CapturePlan, ScenarioMode, SpecificField};

/// The full run produces captures in one fixed order; consumers index
/// into the list positionally.
#[test]
fn all_mode_label_order_is_fixed() {
    let order: Vec<&str> = ScenarioMode::All
        .scenarios()
        .iter()
        .flat_map(|s| s.capture_labels().iter().copied())
        .collect();

    assert_eq!(
        order,
        [
            labels::HOME,
            labels::FORM_FILLED,
            labels::CONFIRM,
            labels::SPECIFIC_DATA_FILLED,
            labels::REGISTRATION_COMPLETE,
            labels::SUBMISSION_WITH_ERRORS,
        ]
    );
}

/// Two dropdown fields and one text field consume exactly two dropdown
/// slots, in document order, and the text field none.
#[test]
fn dropdown_slots_are_consumed_only_by_dropdown_fields() {
    let fields = vec![
        SpecificField::dropdown("style", "Elegant"),
        SpecificField::dropdown("origin", "Brazilian"),
        SpecificField::text("years_experience", "20"),
    ];

    let planned = plan_specific_fields(&fields);
    let slots: Vec<usize> = planned
        .iter()
        .filter_map(|f| match f.target {
            PlannedTarget::Dropdown { slot } => Some(slot),
            PlannedTarget::MaskedInput { .. } => None,
        })
        .collect();

    assert_eq!(slots, [0, 1]);
    assert!(matches!(
        planned[2].target,
        PlannedTarget::MaskedInput { .. }
    ));
}

/// Overrides merge over defaults once, at resolution; unspecified
/// defaults are retained.
#[test]
fn plan_resolution_merges_overrides_over_defaults() {
    let yaml = r#"
persona: Maestro
form:
  cpf: "987.654.321-00"
"#;
    let config = CapturePlan::from_yaml(yaml).unwrap().resolve();

    assert_eq!(config.form.cpf, "987.654.321-00");
    assert_eq!(config.form.email, "joaoomaestro@gmail.com");
    assert_eq!(config.base_url, "http://localhost:3000");
}

/// An empty plan resolves to a complete configuration.
#[test]
fn empty_plan_is_a_valid_plan() {
    let config = CapturePlan::from_yaml("{}").unwrap().resolve();
    assert_eq!(config.persona, "Maestro");
    assert_eq!(config.specific.len(), 3);
}
