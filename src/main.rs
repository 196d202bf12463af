use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use carthage_cache::cli::Cli;
use carthage_cache::{
    logging, ManifestCache, Step, StepConfig, StepError, StepSettings, SystemTool,
};

fn main() -> ExitCode {
    // Initialize structured logging
    logging::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Step errors are already logged where they occur
            let code = match err.downcast_ref::<StepError>() {
                Some(step_err) => step_err.exit_code(),
                None => {
                    tracing::error!("{:#}", err);
                    1
                }
            };
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // CLI and env win over the config file
    let file_settings = match &cli.config {
        Some(path) => StepSettings::from_file(path)?,
        None => StepSettings::default(),
    };
    let config = StepConfig::resolve(cli.settings().or(file_settings));

    let cache = ManifestCache::for_config(&config).context("Failed to resolve working directory")?;

    Step::new(&config, cache, SystemTool)
        .dry_run(cli.dry_run)
        .execute()?;

    Ok(())
}
