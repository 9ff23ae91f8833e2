//! engine::cache
//!
//! The state cache: moving a component's `.terraform` working state between
//! its persistent, addressable location and the live template directory.
//!
//! # Model
//!
//! For a given (environment, project, component) triple the cached state is
//! always in exactly one of two places:
//!
//! - **at rest**: `states/<env>/<project>/<component>/`
//! - **checked out**: `projects/<project>/<alias>/.terraform/`
//!
//! [`StateCache::checkout`] moves it from rest to live and returns a
//! [`StateLease`]. The lease must be settled back exactly once;
//! [`StateLease::commit`] does so explicitly, and `Drop` settles best-effort
//! if the explicit call never happened (early return, panic, interrupt).
//! The state is the only source of truth between invocations; losing it is
//! unrecoverable, so no code path may leave a checkout unsettled.
//!
//! # New-File Sweep
//!
//! Terraform commands may drop new files next to the templates (plan output,
//! generated graphs). Anything appearing in the component directory after
//! checkout is swept into the persistent directory at commit, keeping the
//! template directory pristine.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::context::RunContext;
use crate::core::paths::Layout;
use crate::ui::output::{self, Verbosity};

/// The reserved subpath Terraform itself reads and writes.
const LIVE_SUBDIR: &str = ".terraform";

/// Marker files that must exist in a complete at-rest state.
const STATE_MARKER: &str = "terraform.tfstate";
const PLUGIN_MARKER: &str = "plugins";

/// Errors from state cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("component directory not found: {0}")]
    ComponentDirMissing(PathBuf),

    #[error("working state already checked out at {0}")]
    AlreadyCheckedOut(PathBuf),

    #[error("failed to move state '{from}' -> '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The persistent home of one component's working state.
#[derive(Debug, Clone)]
pub struct StateCache {
    state_dir: PathBuf,
    work_dir: PathBuf,
    verbosity: Verbosity,
}

impl StateCache {
    /// Build the cache handle for a run context.
    pub fn for_context(ctx: &RunContext) -> Self {
        let alias = ctx.component_config.template_alias(ctx.component);
        Self::new(ctx.layout, ctx.environment, ctx.project, ctx.component, alias)
            .with_verbosity(ctx.verbosity)
    }

    /// Build a cache handle from explicit coordinates.
    pub fn new(
        layout: &Layout,
        environment: &str,
        project: &str,
        component: &str,
        alias: &str,
    ) -> Self {
        Self {
            state_dir: layout.state_dir(environment, project, component),
            work_dir: layout.component_dir(project, alias),
            verbosity: Verbosity::Quiet,
        }
    }

    fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The live working directory for this component's templates.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Whether a cold bootstrap (`init`) is required.
    ///
    /// True when forced by override, when the persistent directory is
    /// absent, or when it is missing the state file or the plugin marker.
    pub fn needs_bootstrap(&self, force: bool) -> bool {
        force
            || !self.state_dir.is_dir()
            || !self.state_dir.join(STATE_MARKER).exists()
            || !self.state_dir.join(PLUGIN_MARKER).exists()
    }

    /// Check the state out into the live working directory.
    ///
    /// Moves the persistent directory to `<work_dir>/.terraform` when it
    /// exists, or creates an empty one otherwise. Afterwards exactly one of
    /// {at rest, checked out} holds; the returned lease restores the other
    /// side on settle.
    pub fn checkout(self) -> Result<StateLease, CacheError> {
        if !self.work_dir.is_dir() {
            return Err(CacheError::ComponentDirMissing(self.work_dir));
        }

        let live_dir = self.work_dir.join(LIVE_SUBDIR);
        if live_dir.exists() {
            return Err(CacheError::AlreadyCheckedOut(live_dir));
        }

        let baseline = list_entries(&self.work_dir)?;

        if self.state_dir.exists() {
            output::debug(
                format!("checking out state from {}", self.state_dir.display()),
                self.verbosity,
            );
            move_dir(&self.state_dir, &live_dir)?;
        } else {
            output::debug("no cached state, starting fresh", self.verbosity);
            fs::create_dir_all(&live_dir)?;
        }

        Ok(StateLease {
            state_dir: self.state_dir,
            work_dir: self.work_dir,
            live_dir,
            baseline,
            verbosity: self.verbosity,
            settled: false,
        })
    }
}

/// A checked-out working state.
///
/// Exactly one lease exists per component at a time; the runner processes
/// components sequentially and checks out at most one.
#[derive(Debug)]
pub struct StateLease {
    state_dir: PathBuf,
    work_dir: PathBuf,
    live_dir: PathBuf,
    baseline: BTreeSet<OsString>,
    verbosity: Verbosity,
    settled: bool,
}

impl StateLease {
    /// Move the working state back to its persistent location.
    ///
    /// Replaces any prior at-rest contents, then sweeps files that appeared
    /// in the component directory since checkout into the persistent
    /// directory. Safe to call after success or failure of the wrapped
    /// command; the lease is consumed, so it runs exactly once.
    pub fn commit(mut self) -> Result<(), CacheError> {
        self.settle()
    }

    fn settle(&mut self) -> Result<(), CacheError> {
        if self.settled {
            return Ok(());
        }
        self.settled = true;

        output::debug(
            format!("saving state into {}", self.state_dir.display()),
            self.verbosity,
        );

        if self.live_dir.exists() {
            if self.state_dir.exists() {
                fs::remove_dir_all(&self.state_dir)?;
            }
            if let Some(parent) = self.state_dir.parent() {
                fs::create_dir_all(parent)?;
            }
            move_dir(&self.live_dir, &self.state_dir)?;
        }

        // Sweep anything the tool generated next to the templates.
        if self.state_dir.is_dir() {
            for name in list_entries(&self.work_dir)? {
                if !self.baseline.contains(&name) {
                    move_entry(&self.work_dir.join(&name), &self.state_dir.join(&name))?;
                }
            }
        }

        Ok(())
    }
}

impl Drop for StateLease {
    fn drop(&mut self) {
        if !self.settled {
            if let Err(e) = self.settle() {
                output::error(format!(
                    "failed to save working state back to {}: {}",
                    self.state_dir.display(),
                    e
                ));
            }
        }
    }
}

fn list_entries(dir: &Path) -> io::Result<BTreeSet<OsString>> {
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        names.insert(entry?.file_name());
    }
    Ok(names)
}

/// Move a directory, falling back to copy-and-remove when a plain rename
/// fails (e.g., across filesystems).
fn move_dir(from: &Path, to: &Path) -> Result<(), CacheError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    copy_dir_all(from, to).map_err(|source| CacheError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    fs::remove_dir_all(from).map_err(|source| CacheError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Move a single directory entry, file or directory.
fn move_entry(from: &Path, to: &Path) -> Result<(), CacheError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    if from.is_dir() {
        move_dir(from, to)
    } else {
        fs::copy(from, to)
            .and_then(|_| fs::remove_file(from))
            .map_err(|source| CacheError::Move {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }
}

fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        layout: Layout,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let layout = Layout::with_plugin_cache(
                tmp.path().to_path_buf(),
                tmp.path().join("plugins"),
            );
            fs::create_dir_all(layout.component_dir("blog", "web")).unwrap();
            Self { _tmp: tmp, layout }
        }

        fn cache(&self) -> StateCache {
            StateCache::new(&self.layout, "prod", "blog", "web", "web")
        }

        fn state_dir(&self) -> PathBuf {
            self.layout.state_dir("prod", "blog", "web")
        }

        fn live_dir(&self) -> PathBuf {
            self.layout.component_dir("blog", "web").join(LIVE_SUBDIR)
        }

        /// Seed a complete at-rest state (both markers present).
        fn seed_state(&self) {
            let dir = self.state_dir();
            fs::create_dir_all(dir.join(PLUGIN_MARKER)).unwrap();
            fs::write(dir.join(STATE_MARKER), "{}").unwrap();
        }
    }

    #[test]
    fn needs_bootstrap_when_state_dir_absent() {
        let fx = Fixture::new();
        assert!(fx.cache().needs_bootstrap(false));
    }

    #[test]
    fn needs_bootstrap_when_marker_missing() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.state_dir().join(PLUGIN_MARKER)).unwrap();
        // plugins present, tfstate missing
        assert!(fx.cache().needs_bootstrap(false));

        fs::write(fx.state_dir().join(STATE_MARKER), "{}").unwrap();
        assert!(!fx.cache().needs_bootstrap(false));
    }

    #[test]
    fn needs_bootstrap_when_forced() {
        let fx = Fixture::new();
        fx.seed_state();
        assert!(fx.cache().needs_bootstrap(true));
        assert!(!fx.cache().needs_bootstrap(false));
    }

    #[test]
    fn checkout_moves_state_into_live_dir() {
        let fx = Fixture::new();
        fx.seed_state();

        let lease = fx.cache().checkout().unwrap();
        assert!(!fx.state_dir().exists());
        assert!(fx.live_dir().join(STATE_MARKER).exists());
        lease.commit().unwrap();
    }

    #[test]
    fn checkout_creates_empty_live_dir_when_cold() {
        let fx = Fixture::new();
        let lease = fx.cache().checkout().unwrap();
        assert!(fx.live_dir().is_dir());
        lease.commit().unwrap();
    }

    #[test]
    fn checkout_fails_when_already_checked_out() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.live_dir()).unwrap();
        assert!(matches!(
            fx.cache().checkout(),
            Err(CacheError::AlreadyCheckedOut(_))
        ));
    }

    #[test]
    fn checkout_fails_without_component_dir() {
        let fx = Fixture::new();
        let cache = StateCache::new(&fx.layout, "prod", "blog", "missing", "missing");
        assert!(matches!(
            cache.checkout(),
            Err(CacheError::ComponentDirMissing(_))
        ));
    }

    #[test]
    fn checkout_commit_round_trip_restores_content() {
        let fx = Fixture::new();
        fx.seed_state();
        fs::write(fx.state_dir().join("extra.json"), "x").unwrap();

        fx.cache().checkout().unwrap().commit().unwrap();

        assert!(!fx.live_dir().exists());
        assert!(fx.state_dir().join(STATE_MARKER).exists());
        assert!(fx.state_dir().join(PLUGIN_MARKER).is_dir());
        assert_eq!(fs::read_to_string(fx.state_dir().join("extra.json")).unwrap(), "x");
    }

    #[test]
    fn commit_persists_fresh_state() {
        let fx = Fixture::new();
        let lease = fx.cache().checkout().unwrap();
        fs::write(fx.live_dir().join(STATE_MARKER), "{}").unwrap();
        lease.commit().unwrap();

        assert!(fx.state_dir().join(STATE_MARKER).exists());
        assert!(!fx.live_dir().exists());
    }

    #[test]
    fn commit_sweeps_new_files_into_state_dir() {
        let fx = Fixture::new();
        fx.seed_state();
        let work = fx.layout.component_dir("blog", "web");
        fs::write(work.join("main.tf"), "").unwrap();

        let lease = fx.cache().checkout().unwrap();
        fs::write(work.join("plan.out"), "binary").unwrap();
        lease.commit().unwrap();

        // Pre-existing template untouched, generated file swept.
        assert!(work.join("main.tf").exists());
        assert!(!work.join("plan.out").exists());
        assert!(fx.state_dir().join("plan.out").exists());
    }

    #[test]
    fn drop_without_commit_settles() {
        let fx = Fixture::new();
        fx.seed_state();

        {
            let _lease = fx.cache().checkout().unwrap();
            assert!(!fx.state_dir().exists());
        }

        // Dropped unsettled: state is back at rest, live copy gone.
        assert!(fx.state_dir().join(STATE_MARKER).exists());
        assert!(!fx.live_dir().exists());
    }

    #[test]
    fn settle_is_never_double_applied() {
        let fx = Fixture::new();
        fx.seed_state();

        let lease = fx.cache().checkout().unwrap();
        lease.commit().unwrap();
        // Drop after commit must not disturb the at-rest state.
        assert!(fx.state_dir().join(STATE_MARKER).exists());
    }

    #[test]
    fn never_both_present_or_both_absent() {
        let fx = Fixture::new();
        fx.seed_state();

        let lease = fx.cache().checkout().unwrap();
        let live = fx.live_dir().exists();
        let rest = fx.state_dir().exists();
        assert!(live ^ rest);

        drop(lease);
        let live = fx.live_dir().exists();
        let rest = fx.state_dir().exists();
        assert!(live ^ rest);
    }
}
