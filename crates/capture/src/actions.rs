//! Low-level interaction primitives against a live page
//!
//! Every primitive suspends the calling flow until the DOM condition it
//! needs is satisfied or its bounded wait elapses. Failures surface
//! immediately; retry policy belongs to no one (a flaky step is better
//! surfaced than masked).

use std::time::{Duration, Instant};

use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tracing::debug;

use crate::error::{AutomationError, AutomationResult};

/// Selectors that are part of the target UI's widget contract
pub mod selectors {
    /// Dropdown control
    pub const DROPDOWN: &str = ".p-dropdown";
    /// Option panel rendered while a dropdown is open
    pub const DROPDOWN_PANEL: &str = ".p-dropdown-panel";
    /// Items inside the option panel
    pub const DROPDOWN_ITEM: &str = "li.p-dropdown-item";
    /// Confirmation modal shown after submitting the registration form
    pub const MODAL: &str = ".p-dialog.p-component";

    /// Selector for a form input addressed by its `name` attribute
    pub fn input_named(name: &str) -> String {
        format!("input[name=\"{}\"]", name)
    }
}

/// Bounds for a single DOM wait
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Wait until `selector` matches an element, polling until the bound elapses.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    wait: &WaitOptions,
) -> AutomationResult<Element> {
    let start = Instant::now();
    loop {
        match page.find_element(selector).await {
            Ok(element) => return Ok(element),
            Err(_) => {
                if start.elapsed() >= wait.timeout {
                    return Err(AutomationError::Timeout {
                        what: format!("selector '{}'", selector),
                        timeout: wait.timeout,
                    });
                }
                tokio::time::sleep(wait.poll_interval).await;
            }
        }
    }
}

/// Click the first button (document order) whose visible text contains `text`.
///
/// With `within`, the search is scoped to the first element matching that
/// selector (waited for); without, the current button set is queried once.
pub async fn click_by_text(
    page: &Page,
    text: &str,
    within: Option<&str>,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    click_by_any_text(page, &[text], within, wait).await
}

/// Like [`click_by_text`], accepting any of several labels. The target UI
/// reuses one screen for create and edit, so finishing buttons may read
/// either way.
pub async fn click_by_any_text(
    page: &Page,
    texts: &[&str],
    within: Option<&str>,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    let buttons = match within {
        Some(scope_selector) => {
            let scope = wait_for_selector(page, scope_selector, wait).await?;
            scope.find_elements("button").await.unwrap_or_default()
        }
        None => page.find_elements("button").await.unwrap_or_default(),
    };

    for button in &buttons {
        if let Ok(Some(label)) = button.inner_text().await {
            if texts.iter().any(|t| label.contains(t)) {
                debug!("clicking button '{}'", label.trim());
                button.click().await?;
                return Ok(());
            }
        }
    }

    Err(AutomationError::ElementNotFound(describe_button(texts, within)))
}

/// Open the dropdown at `dropdown_selector` and pick the option whose
/// trimmed text equals `option_label` exactly.
pub async fn select_dropdown_option(
    page: &Page,
    dropdown_selector: &str,
    option_label: &str,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    let dropdown = wait_for_selector(page, dropdown_selector, wait).await?;
    pick_dropdown_option(page, &dropdown, option_label, wait).await
}

/// Variant of [`select_dropdown_option`] for an already-resolved dropdown
/// control (the specific-data screen addresses dropdowns positionally).
///
/// A label with no exact match fails with `OptionNotFound` and clicks no
/// option.
pub async fn pick_dropdown_option(
    page: &Page,
    dropdown: &Element,
    option_label: &str,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    dropdown.click().await?;
    wait_for_selector(page, selectors::DROPDOWN_PANEL, wait).await?;

    let items = page
        .find_elements(selectors::DROPDOWN_ITEM)
        .await
        .unwrap_or_default();
    for item in &items {
        if let Ok(Some(text)) = item.inner_text().await {
            if text.trim() == option_label {
                item.click().await?;
                return Ok(());
            }
        }
    }

    Err(AutomationError::OptionNotFound {
        label: option_label.to_string(),
    })
}

/// Focus the field at `selector` and type `text` as simulated keystrokes.
///
/// Keystrokes, not value assignment: the target application runs its input
/// masking (CPF formatting and the like) off key events.
pub async fn type_into_field(
    page: &Page,
    selector: &str,
    text: &str,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    let field = wait_for_selector(page, selector, wait).await?;
    field.click().await?;
    field.type_str(text).await?;
    Ok(())
}

/// Replace the content of a masked numeric field.
///
/// Select-all, one Backspace, keystroke the value, Tab out. The mask
/// widget ignores plain value replacement; it commits on blur after real
/// key events.
pub async fn type_into_masked_field(
    page: &Page,
    selector: &str,
    value: &str,
    wait: &WaitOptions,
) -> AutomationResult<()> {
    let field = wait_for_selector(page, selector, wait).await?;
    field.focus().await?;
    field.call_js_fn("function() { this.select(); }", false).await?;
    field.press_key("Backspace").await?;
    field.type_str(value).await?;
    field.press_key("Tab").await?;
    Ok(())
}

fn describe_button(texts: &[&str], within: Option<&str>) -> String {
    let labels = match texts {
        [single] => format!("button containing '{}'", single),
        many => format!(
            "button containing one of [{}]",
            many.iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    match within {
        Some(scope) => format!("{} within '{}'", labels, scope),
        None => labels,
    }
}
