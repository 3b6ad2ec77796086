//! The capture step: persist a full-page screenshot to a deterministic path

use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AutomationError, AutomationResult};

/// A produced screenshot artifact. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// Fixed label from the artifact naming contract
    pub label: String,
    /// Path of the written PNG
    pub path: PathBuf,
}

/// Take a full-scrollable-page screenshot of the current page state and
/// write it to `{dir}/{label}.png`, creating `dir` on first use.
///
/// Never fails silently: both the CDP capture and the filesystem write
/// surface as [`AutomationError::Capture`].
pub async fn capture(page: &Page, dir: &Path, label: &str) -> AutomationResult<Capture> {
    std::fs::create_dir_all(dir).map_err(|e| AutomationError::Capture {
        label: label.to_string(),
        reason: format!("creating {}: {}", dir.display(), e),
    })?;

    let bytes = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build(),
        )
        .await
        .map_err(|e| AutomationError::Capture {
            label: label.to_string(),
            reason: e.to_string(),
        })?;

    let path = dir.join(format!("{}.png", label));
    std::fs::write(&path, &bytes).map_err(|e| AutomationError::Capture {
        label: label.to_string(),
        reason: format!("writing {}: {}", path.display(), e),
    })?;

    info!("captured {}", path.display());
    Ok(Capture {
        label: label.to_string(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_serializes_with_label_and_path() {
        let shot = Capture {
            label: "home".to_string(),
            path: PathBuf::from("/tmp/screenshots/home.png"),
        };
        let json = serde_json::to_value(&shot).unwrap();
        assert_eq!(json["label"], "home");
        assert_eq!(json["path"], "/tmp/screenshots/home.png");
    }
}
