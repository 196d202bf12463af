/// Carthage flag collection
///
/// Turns a [`StepConfig`] into the ordered flags appended after the
/// subcommand: platform, verbose, no-use-binaries, use-ssh, raw options.
use std::fmt;

use crate::config::StepConfig;
use crate::error::StepError;

/// One flag passed to carthage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarthageFlag {
    Platform(String),
    Verbose,
    NoUseBinaries,
    UseSsh,
    /// User-supplied extra options: the raw blob and its shell-style words
    Options { raw: String, args: Vec<String> },
}

impl CarthageFlag {
    /// Arguments handed to the subprocess for this flag
    pub fn argv(&self) -> Vec<String> {
        match self {
            CarthageFlag::Platform(value) => vec!["--platform".to_string(), value.clone()],
            CarthageFlag::Verbose => vec!["--verbose".to_string()],
            CarthageFlag::NoUseBinaries => vec!["--no-use-binaries".to_string()],
            CarthageFlag::UseSsh => vec!["--use-ssh".to_string()],
            CarthageFlag::Options { args, .. } => args.clone(),
        }
    }

    /// Split an options blob the way a POSIX shell would, without running one
    pub fn options(raw: &str) -> Result<Self, StepError> {
        let args = shell_words::split(raw).map_err(|e| StepError::InvalidOptions {
            options: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(CarthageFlag::Options {
            raw: raw.to_string(),
            args,
        })
    }
}

impl fmt::Display for CarthageFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarthageFlag::Platform(value) => write!(f, "--platform {value}"),
            CarthageFlag::Verbose => f.write_str("--verbose"),
            CarthageFlag::NoUseBinaries => f.write_str("--no-use-binaries"),
            CarthageFlag::UseSsh => f.write_str("--use-ssh"),
            CarthageFlag::Options { raw, .. } => f.write_str(raw),
        }
    }
}

/// Collect flags in their fixed order
pub fn collect_args(config: &StepConfig) -> Result<Vec<CarthageFlag>, StepError> {
    let mut flags = Vec::new();

    if let Some(platform) = &config.platform {
        flags.push(CarthageFlag::Platform(platform.clone()));
    }
    if config.verbose {
        flags.push(CarthageFlag::Verbose);
    }
    if config.no_use_binaries {
        flags.push(CarthageFlag::NoUseBinaries);
    }
    if config.use_ssh {
        flags.push(CarthageFlag::UseSsh);
    }
    if let Some(options) = &config.options {
        flags.push(CarthageFlag::options(options)?);
    }

    Ok(flags)
}
