//! Browser-automation sequencing engine for delivery screenshot capture
//!
//! Drives a Chromium instance through the target web application's
//! registration workflow and persists full-page screenshots under fixed
//! labels for the document-assembly step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Capture Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Runner                                                     │
//! │    └── run(mode) -> RunOutcome                              │
//! │          └── Sequencer                                      │
//! │                ├── Session (one browser, one page)          │
//! │                ├── actions (wait / click / select / type)   │
//! │                └── capture(page, dir, label) -> Capture     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CapturePlan (YAML)                                         │
//! │    ├── base_url, persona, screenshot_dir                    │
//! │    ├── form: { field -> override }                          │
//! │    └── specific: [ { name, value, kind } ]                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each scenario opens and closes its own session; scenarios run
//! strictly sequentially because registration mutates server-side state
//! later scenarios may depend on.

pub mod actions;
pub mod config;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod shot;

pub use config::{CaptureConfig, CapturePlan, FieldKind, FormFields, SpecificField};
pub use error::{AutomationError, AutomationResult};
pub use runner::{RunFailure, RunOutcome, Runner};
pub use scenario::{Scenario, ScenarioMode, Sequencer};
pub use session::{Session, SessionOptions};
pub use shot::Capture;
