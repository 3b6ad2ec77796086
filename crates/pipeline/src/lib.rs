//! Delivery pipeline around the capture engine
//!
//! Everything a delivery needs besides the screenshots themselves:
//! invoking the external document generators, bringing the target
//! application server up and down, relocating produced files, and the
//! chained full process that runs all of it in order.

pub mod error;
pub mod generator;
pub mod process;
pub mod relocate;
pub mod server;

pub use error::{PipelineError, PipelineResult};
pub use generator::{DocumentGenerator, GenerateRequest, GeneratorConfig, GeneratorOutput};
pub use process::{run_full_process, CollectStep, ProcessOptions, ProcessReport};
pub use relocate::{move_files, MoveFailure, MoveReport, MovedFile};
pub use server::{AppServer, AppServerConfig};
