/// Resolved-manifest cache
///
/// Compares `Cartfile.resolved` against the copy stored under `Carthage/`
/// and refreshes that copy after a successful carthage run.
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::StepConfig;
use crate::error::StepError;
use crate::logging::{operations, status};

/// Manifest produced by carthage, relative to the working directory
pub const MANIFEST_FILE: &str = "Cartfile.resolved";

/// Cached copy of the manifest, relative to the working directory
pub const CACHED_MANIFEST_FILE: &str = "Carthage/bitrise-Cartfile.resolved";

/// Why carthage has to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReason {
    MissingCommand,
    UpdateCommand,
    ManifestMissing,
    CacheMissing,
    ManifestChanged,
    Unreadable,
}

impl RunReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunReason::MissingCommand => "missing_command",
            RunReason::UpdateCommand => "update_command",
            RunReason::ManifestMissing => "manifest_missing",
            RunReason::CacheMissing => "cache_missing",
            RunReason::ManifestChanged => "manifest_changed",
            RunReason::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for RunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the cache check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Skip,
    Run(RunReason),
}

impl CacheDecision {
    pub fn must_run(&self) -> bool {
        matches!(self, CacheDecision::Run(_))
    }
}

/// The pair of manifest files inside one working directory
#[derive(Debug, Clone)]
pub struct ManifestCache {
    root: PathBuf,
}

impl ManifestCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache for the configured working directory, anchored at the process's
    /// current directory
    pub fn for_config(config: &StepConfig) -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?.join(&config.working_dir)))
    }

    /// Absolute working directory for both manifests and the carthage process
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn cached_path(&self) -> PathBuf {
        self.root.join(CACHED_MANIFEST_FILE)
    }

    /// Decide whether carthage must run for `config`
    pub fn check(&self, config: &StepConfig) -> CacheDecision {
        let decision = match config.command {
            None => CacheDecision::Run(RunReason::MissingCommand),
            Some(_) if config.is_update() => CacheDecision::Run(RunReason::UpdateCommand),
            Some(_) => self.compare(),
        };

        match decision {
            CacheDecision::Skip => info!(
                operation = operations::CHECK,
                status = status::SKIP,
                "manifest unchanged"
            ),
            CacheDecision::Run(reason) => info!(
                operation = operations::CHECK,
                status = status::RUN,
                reason = %reason,
                "carthage required"
            ),
        }

        decision
    }

    /// Byte-for-byte comparison of the manifest and its cached copy
    fn compare(&self) -> CacheDecision {
        let manifest = match read_manifest(&self.manifest_path()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheDecision::Run(RunReason::ManifestMissing),
            Err(_) => return CacheDecision::Run(RunReason::Unreadable),
        };
        let cached = match read_manifest(&self.cached_path()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheDecision::Run(RunReason::CacheMissing),
            Err(_) => return CacheDecision::Run(RunReason::Unreadable),
        };

        debug!(
            operation = operations::CHECK,
            manifest_sha256 = %digest(&manifest),
            cached_sha256 = %digest(&cached),
            "comparing manifests"
        );

        if manifest == cached {
            CacheDecision::Skip
        } else {
            CacheDecision::Run(RunReason::ManifestChanged)
        }
    }

    /// Overwrite the cached copy with the current manifest.
    ///
    /// The `Carthage/` directory is expected to exist already; it is not created.
    pub fn update(&self) -> Result<PathBuf, StepError> {
        let from = self.manifest_path();
        let to = self.cached_path();

        match fs::copy(&from, &to) {
            Ok(bytes) => {
                info!(
                    operation = operations::COPY,
                    status = status::SUCCESS,
                    size_bytes = bytes,
                    "Copying {} to '{}'",
                    MANIFEST_FILE,
                    to.display()
                );
                Ok(to)
            }
            Err(source) => {
                let err = StepError::CacheUpdate { from, to, source };
                error!(operation = operations::COPY, status = status::ERROR, "{}", err);
                Err(err)
            }
        }
    }
}

/// Read a manifest; `Ok(None)` when it does not exist
fn read_manifest(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            Err(e)
        }
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepSettings;
    use tempfile::TempDir;

    fn config(command: Option<&str>) -> StepConfig {
        let pairs: Vec<(&str, &str)> = command.map(|c| ("carthage_command", c)).into_iter().collect();
        StepConfig::resolve(StepSettings::from_pairs(pairs))
    }

    fn workspace(manifest: Option<&str>, cached: Option<&str>) -> (TempDir, ManifestCache) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Carthage")).unwrap();
        if let Some(content) = manifest {
            fs::write(temp.path().join(MANIFEST_FILE), content).unwrap();
        }
        if let Some(content) = cached {
            fs::write(temp.path().join(CACHED_MANIFEST_FILE), content).unwrap();
        }
        let cache = ManifestCache::new(temp.path());
        (temp, cache)
    }

    const RESOLVED: &str = "github \"Alamofire/Alamofire\" \"5.8.1\"\n";

    #[test]
    fn test_identical_manifests_skip() {
        let (_temp, cache) = workspace(Some(RESOLVED), Some(RESOLVED));
        assert_eq!(cache.check(&config(Some("bootstrap"))), CacheDecision::Skip);
    }

    #[test]
    fn test_changed_manifest_runs() {
        let (_temp, cache) = workspace(Some(RESOLVED), Some("github \"Alamofire/Alamofire\" \"5.8.0\"\n"));
        assert_eq!(
            cache.check(&config(Some("bootstrap"))),
            CacheDecision::Run(RunReason::ManifestChanged)
        );
    }

    #[test]
    fn test_trailing_newline_counts_as_change() {
        let (_temp, cache) = workspace(Some(RESOLVED), Some(RESOLVED.trim_end()));
        assert!(cache.check(&config(Some("bootstrap"))).must_run());
    }

    #[test]
    fn test_missing_cache_runs() {
        let (_temp, cache) = workspace(Some(RESOLVED), None);
        assert_eq!(
            cache.check(&config(Some("bootstrap"))),
            CacheDecision::Run(RunReason::CacheMissing)
        );
    }

    #[test]
    fn test_missing_manifest_runs() {
        let (_temp, cache) = workspace(None, Some(RESOLVED));
        assert_eq!(
            cache.check(&config(Some("bootstrap"))),
            CacheDecision::Run(RunReason::ManifestMissing)
        );
    }

    #[test]
    fn test_update_always_runs() {
        for (manifest, cached) in [
            (Some(RESOLVED), Some(RESOLVED)),
            (Some(RESOLVED), None),
            (None, None),
        ] {
            let (_temp, cache) = workspace(manifest, cached);
            assert_eq!(
                cache.check(&config(Some("update"))),
                CacheDecision::Run(RunReason::UpdateCommand)
            );
        }
    }

    #[test]
    fn test_missing_command_runs() {
        let (_temp, cache) = workspace(Some(RESOLVED), Some(RESOLVED));
        assert_eq!(cache.check(&config(None)), CacheDecision::Run(RunReason::MissingCommand));
    }

    #[test]
    fn test_update_copies_bytes() {
        let (temp, cache) = workspace(Some(RESOLVED), Some("stale\n"));

        let dest = cache.update().unwrap();

        assert_eq!(dest, temp.path().join(CACHED_MANIFEST_FILE));
        assert_eq!(fs::read(&dest).unwrap(), RESOLVED.as_bytes());
        assert_eq!(cache.check(&config(Some("bootstrap"))), CacheDecision::Skip);
    }

    #[test]
    fn test_update_without_carthage_dir_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), RESOLVED).unwrap();
        let cache = ManifestCache::new(temp.path());

        let err = cache.update().unwrap_err();

        assert!(matches!(err, StepError::CacheUpdate { .. }));
        assert!(!temp.path().join("Carthage").exists());
    }

    #[test]
    fn test_update_without_manifest_fails() {
        let (temp, cache) = workspace(None, Some(RESOLVED));

        assert!(cache.update().is_err());
        assert_eq!(
            fs::read_to_string(temp.path().join(CACHED_MANIFEST_FILE)).unwrap(),
            RESOLVED
        );
    }

    #[test]
    fn test_unreadable_manifest_runs() {
        let (temp, cache) = workspace(None, Some(RESOLVED));
        fs::create_dir(temp.path().join(MANIFEST_FILE)).unwrap();

        assert_eq!(
            cache.check(&config(Some("bootstrap"))),
            CacheDecision::Run(RunReason::Unreadable)
        );
    }

    #[test]
    fn test_unreadable_cache_runs() {
        let (temp, cache) = workspace(Some(RESOLVED), None);
        fs::create_dir(temp.path().join(CACHED_MANIFEST_FILE)).unwrap();

        assert_eq!(
            cache.check(&config(Some("bootstrap"))),
            CacheDecision::Run(RunReason::Unreadable)
        );
    }

    #[test]
    fn test_for_config_resolves_against_current_dir() {
        let config = StepConfig::resolve(StepSettings::from_pairs([("working_dir", "ios")]));
        let cache = ManifestCache::for_config(&config).unwrap();
        let expected = std::env::current_dir().unwrap().join("ios").join(MANIFEST_FILE);
        assert_eq!(cache.manifest_path(), expected);
        assert_eq!(cache.root(), std::env::current_dir().unwrap().join("ios"));
    }
}
