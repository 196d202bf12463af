use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a step run with a non-zero exit status
#[derive(Error, Debug)]
pub enum StepError {
    #[error("No carthage command to execute.")]
    MissingCommand,

    #[error("Invalid carthage_options '{options}': {reason}")]
    InvalidOptions { options: String, reason: String },

    #[error("Failed to launch '{tool}': {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("carthage exited with code {code}")]
    ToolFailed { code: i32 },

    #[error("Error copying {} to '{}': {source}", from.display(), to.display())]
    CacheUpdate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}
