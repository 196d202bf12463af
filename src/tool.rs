/// Carthage invocation
///
/// Builds the argv for `carthage <command> <flags...>` and runs it without a
/// shell, inheriting stdio, in the configured working directory.
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{info, warn};

use crate::args::{collect_args, CarthageFlag};
use crate::config::StepConfig;
use crate::error::StepError;
use crate::logging::{operations, status};

/// A fully assembled carthage command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: String,
    pub command: String,
    pub flags: Vec<CarthageFlag>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Assemble the invocation to run in `working_dir`; fails when no
    /// subcommand is configured or the extra options cannot be split
    pub fn from_config(config: &StepConfig, working_dir: &Path) -> Result<Self, StepError> {
        let command = config.command.clone().ok_or(StepError::MissingCommand)?;

        Ok(Self {
            tool: config.tool.clone(),
            command,
            flags: collect_args(config)?,
            working_dir: working_dir.to_path_buf(),
        })
    }

    /// Arguments after the program name
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.command.clone())
            .chain(self.flags.iter().flat_map(CarthageFlag::argv))
            .collect()
    }

    /// Human-readable command line, for logs only
    pub fn command_line(&self) -> String {
        std::iter::once(self.tool.clone())
            .chain(std::iter::once(self.command.clone()))
            .chain(self.flags.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Something that can run a carthage invocation to completion
pub trait DependencyTool {
    fn run(&self, invocation: &Invocation) -> Result<(), StepError>;
}

/// Runs the real executable found on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTool;

impl DependencyTool for SystemTool {
    fn run(&self, invocation: &Invocation) -> Result<(), StepError> {
        let program = which::which(&invocation.tool).unwrap_or_else(|e| {
            warn!(
                "Could not find '{}' in PATH: {}. Trying as-is.",
                invocation.tool, e
            );
            PathBuf::from(&invocation.tool)
        });

        let exit_status = Command::new(&program)
            .args(invocation.argv())
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| StepError::ToolSpawn {
                tool: invocation.tool.clone(),
                source,
            })?;

        // Signal termination has no exit code
        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            info!(
                operation = operations::INVOKE,
                status = status::SUCCESS,
                exit_code = code,
                "carthage finished"
            );
            Ok(())
        } else {
            Err(StepError::ToolFailed { code })
        }
    }
}
