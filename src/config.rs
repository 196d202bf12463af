use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Executable used when no tool override is configured
pub const DEFAULT_TOOL: &str = "carthage";

/// Raw step settings, keyed like the environment variables the CI passes in.
///
/// Every value is an optional string. Interpretation (booleans, defaults)
/// happens once in [`StepConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSettings {
    #[serde(default)]
    pub carthage_command: Option<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub verbose_output: Option<String>,

    #[serde(default)]
    pub no_use_binaries: Option<String>,

    #[serde(default)]
    pub ssh_output: Option<String>,

    #[serde(default)]
    pub carthage_options: Option<String>,

    /// Executable to run instead of `carthage`
    #[serde(default)]
    pub tool: Option<String>,
}

impl StepSettings {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let settings: StepSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(settings)
    }

    /// Build settings from key/value pairs; unrecognised keys are ignored
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "carthage_command" => &mut settings.carthage_command,
                "working_dir" => &mut settings.working_dir,
                "platform" => &mut settings.platform,
                "verbose_output" => &mut settings.verbose_output,
                "no_use_binaries" => &mut settings.no_use_binaries,
                "ssh_output" => &mut settings.ssh_output,
                "carthage_options" => &mut settings.carthage_options,
                "tool" => &mut settings.tool,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        settings
    }

    /// Layer `self` over `fallback`: values set here win
    pub fn or(self, fallback: StepSettings) -> StepSettings {
        StepSettings {
            carthage_command: self.carthage_command.or(fallback.carthage_command),
            working_dir: self.working_dir.or(fallback.working_dir),
            platform: self.platform.or(fallback.platform),
            verbose_output: self.verbose_output.or(fallback.verbose_output),
            no_use_binaries: self.no_use_binaries.or(fallback.no_use_binaries),
            ssh_output: self.ssh_output.or(fallback.ssh_output),
            carthage_options: self.carthage_options.or(fallback.carthage_options),
            tool: self.tool.or(fallback.tool),
        }
    }
}

/// Immutable configuration for one step run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    /// Carthage subcommand; `None` when unset or empty
    pub command: Option<String>,
    pub working_dir: PathBuf,
    pub platform: Option<String>,
    pub verbose: bool,
    pub no_use_binaries: bool,
    pub use_ssh: bool,
    pub options: Option<String>,
    pub tool: String,
}

impl StepConfig {
    pub fn resolve(settings: StepSettings) -> Self {
        Self {
            command: settings.carthage_command.filter(|c| !c.is_empty()),
            working_dir: settings
                .working_dir
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            platform: settings.platform,
            verbose: is_true(settings.verbose_output.as_deref()),
            no_use_binaries: is_true(settings.no_use_binaries.as_deref()),
            use_ssh: is_true(settings.ssh_output.as_deref()),
            options: settings.carthage_options,
            tool: settings
                .tool
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TOOL.to_string()),
        }
    }

    pub fn is_update(&self) -> bool {
        self.command.as_deref() == Some("update")
    }
}

/// Only the exact string "true" enables a flag
fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}
