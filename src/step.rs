/// Step orchestration: check the manifest cache, run carthage if needed,
/// then refresh the cached manifest.
use tracing::{error, info};

use crate::cache::{CacheDecision, ManifestCache};
use crate::config::StepConfig;
use crate::error::StepError;
use crate::logging::{operations, status};
use crate::tool::{DependencyTool, Invocation};

/// How a step run ended successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Cached manifest matched; carthage did not run
    Skipped,
    /// Carthage ran and the cached manifest was refreshed
    Ran,
    /// Carthage would have run, but dry-run mode was on
    DryRun(Invocation),
}

pub struct Step<'a, T: DependencyTool> {
    config: &'a StepConfig,
    cache: ManifestCache,
    tool: T,
    dry_run: bool,
}

impl<'a, T: DependencyTool> Step<'a, T> {
    pub fn new(config: &'a StepConfig, cache: ManifestCache, tool: T) -> Self {
        Self {
            config,
            cache,
            tool,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn execute(&self) -> Result<StepOutcome, StepError> {
        if self.cache.check(self.config) == CacheDecision::Skip {
            info!("Cached carthage content matches Cartfile.resolved, skipping Carthage.");
            return Ok(StepOutcome::Skipped);
        }

        let invocation = Invocation::from_config(self.config, self.cache.root())
            .inspect_err(|e| error!("{}", e))?;

        info!(
            operation = operations::INVOKE,
            "Running carthage command: {}",
            invocation.command_line()
        );

        if self.dry_run {
            info!("Dry run, not executing carthage");
            return Ok(StepOutcome::DryRun(invocation));
        }

        if let Err(e) = self.tool.run(&invocation) {
            error!(operation = operations::INVOKE, status = status::ERROR, "{}", e);
            error!("Error while running carthage.");
            return Err(e);
        }

        self.cache.update()?;

        Ok(StepOutcome::Ran)
    }
}
