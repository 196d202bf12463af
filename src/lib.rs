// Library interface for carthage-cache
// This allows integration tests and external code to drive the step directly

pub mod args;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod step;
pub mod tool;

// Re-export commonly used types
pub use cache::{CacheDecision, ManifestCache, RunReason};
pub use config::{StepConfig, StepSettings};
pub use error::StepError;
pub use step::{Step, StepOutcome};
pub use tool::{DependencyTool, Invocation, SystemTool};
