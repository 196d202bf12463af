use clap::Parser;

use crate::config::StepSettings;

/// carthage-cache - run Carthage only when Cartfile.resolved changed
///
/// Compares Cartfile.resolved with the copy cached under Carthage/ and skips
/// the carthage run when they match. Every option can also be supplied
/// through the environment variable of the same name, as CI steps do.
#[derive(Parser, Debug)]
#[command(name = "carthage-cache")]
#[command(author = "Tuist Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Carthage only when Cartfile.resolved changed", long_about = None)]
pub struct Cli {
    /// Config file path (TOML, same keys as the environment variables)
    #[arg(short = 'c', long, env = "CARTHAGE_CACHE_CONFIG")]
    pub config: Option<String>,

    /// Carthage subcommand to run (e.g. "bootstrap", "update")
    #[arg(long, env = "carthage_command")]
    pub carthage_command: Option<String>,

    /// Directory containing Cartfile.resolved
    #[arg(long, env = "working_dir")]
    pub working_dir: Option<String>,

    /// Value for --platform
    #[arg(long, env = "platform")]
    pub platform: Option<String>,

    /// "true" to pass --verbose
    #[arg(long, env = "verbose_output")]
    pub verbose_output: Option<String>,

    /// "true" to pass --no-use-binaries
    #[arg(long, env = "no_use_binaries")]
    pub no_use_binaries: Option<String>,

    /// "true" to pass --use-ssh
    #[arg(long, env = "ssh_output")]
    pub ssh_output: Option<String>,

    /// Extra options appended to the carthage command
    #[arg(long, env = "carthage_options", allow_hyphen_values = true)]
    pub carthage_options: Option<String>,

    /// Carthage executable
    #[arg(long, env = "CARTHAGE_CACHE_TOOL")]
    pub tool: Option<String>,

    /// Check the cache and print the command without running it
    #[arg(long, env = "CARTHAGE_CACHE_DRY_RUN")]
    pub dry_run: bool,
}

impl Cli {
    /// Settings given on the command line or in the environment
    pub fn settings(&self) -> StepSettings {
        StepSettings {
            carthage_command: self.carthage_command.clone(),
            working_dir: self.working_dir.clone(),
            platform: self.platform.clone(),
            verbose_output: self.verbose_output.clone(),
            no_use_binaries: self.no_use_binaries.clone(),
            ssh_output: self.ssh_output.clone(),
            carthage_options: self.carthage_options.clone(),
            tool: self.tool.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_flags_map_to_settings() {
        let cli = Cli::try_parse_from([
            "carthage-cache",
            "--carthage-command",
            "bootstrap",
            "--platform",
            "iOS",
            "--verbose-output",
            "true",
            "--carthage-options",
            "--cache-builds --new-resolver",
        ])
        .unwrap();

        let settings = cli.settings();
        assert_eq!(settings.carthage_command.as_deref(), Some("bootstrap"));
        assert_eq!(settings.platform.as_deref(), Some("iOS"));
        assert_eq!(settings.verbose_output.as_deref(), Some("true"));
        assert_eq!(
            settings.carthage_options.as_deref(),
            Some("--cache-builds --new-resolver")
        );
        assert!(!cli.dry_run);
    }

    #[test]
    #[serial]
    fn test_environment_variables_are_read() {
        std::env::set_var("carthage_command", "update");
        std::env::set_var("ssh_output", "true");

        let cli = Cli::try_parse_from(["carthage-cache"]).unwrap();

        std::env::remove_var("carthage_command");
        std::env::remove_var("ssh_output");

        let settings = cli.settings();
        assert_eq!(settings.carthage_command.as_deref(), Some("update"));
        assert_eq!(settings.ssh_output.as_deref(), Some("true"));
    }

    #[test]
    #[serial]
    fn test_flag_overrides_environment() {
        std::env::set_var("platform", "macOS");

        let cli = Cli::try_parse_from(["carthage-cache", "--platform", "iOS"]).unwrap();

        std::env::remove_var("platform");
        assert_eq!(cli.platform.as_deref(), Some("iOS"));
    }
}
