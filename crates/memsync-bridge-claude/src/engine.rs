//! Memory-engine collaborator: an external binary queried for recall text.
//!
//! Invoked as `<bin> --db <path> <subcommand…>`. Anything short of exit 0
//! with non-empty stdout counts as "no result".

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::process::run_with_timeout;

pub const DEFAULT_ENGINE_BIN: &str = "memsync-engine";
pub const DEFAULT_BOOST: f64 = 1.5;

const SHORT_TIMEOUT: Duration = Duration::from_secs(5);
const LONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment the engine lookup depends on.
#[derive(Debug, Clone, Default)]
pub(crate) struct EngineEnv {
    pub bin_name: Option<String>,
    pub plugin_root: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub path_var: Option<std::ffi::OsString>,
    pub db: Option<PathBuf>,
    pub boost: Option<String>,
}

impl EngineEnv {
    pub(crate) fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            bin_name: non_empty("MEMSYNC_ENGINE_BIN"),
            plugin_root: non_empty("CLAUDE_PLUGIN_ROOT").map(PathBuf::from),
            home: dirs::home_dir(),
            path_var: std::env::var_os("PATH"),
            db: non_empty("CLAUDE_MEMORY_DB").map(PathBuf::from),
            boost: non_empty("CLAUDE_MEMORY_BOOST"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MemoryEngine {
    bin: PathBuf,
    db: PathBuf,
    boost: f64,
}

impl MemoryEngine {
    /// Find the engine binary and database. `None` unless both exist.
    pub(crate) fn locate(env: &EngineEnv) -> Option<Self> {
        let bin = find_binary(env)?;
        let db = env
            .db
            .clone()
            .or_else(|| env.home.as_ref().map(|h| h.join(".claude").join("memory.db")))?;
        if !db.exists() {
            tracing::debug!(db = %db.display(), "memory database not found");
            return None;
        }
        let boost = env
            .boost
            .as_deref()
            .and_then(|b| b.trim().parse::<f64>().ok())
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(DEFAULT_BOOST);
        Some(Self { bin, db, boost })
    }

    fn run(&self, cwd: &Path, args: &[&str], timeout: Duration) -> Option<String> {
        let db = self.db.to_string_lossy().into_owned();
        let mut full: Vec<&str> = vec!["--db", db.as_str()];
        full.extend_from_slice(args);
        run_with_timeout(&self.bin, &full, cwd, timeout)
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    }

    /// Recent-session recall followed by the first search that answers.
    pub(crate) fn recall(&self, project: &str, cwd: &Path) -> Vec<String> {
        let mut parts = Vec::new();

        if let Some(text) = self.run(
            cwd,
            &["session", "recall", project, "--hours", "72", "--tokens", "500"],
            SHORT_TIMEOUT,
        ) {
            parts.push(text);
        }

        let boost = self.boost.to_string();
        let search = self
            .run(
                cwd,
                &[
                    "workdir",
                    "search",
                    project,
                    "--tag",
                    project,
                    "--boost",
                    boost.as_str(),
                    "--limit",
                    "10",
                ],
                LONG_TIMEOUT,
            )
            .or_else(|| {
                self.run(
                    cwd,
                    &["hybrid-search", project, "--limit", "10", "--format", "context"],
                    LONG_TIMEOUT,
                )
            })
            .or_else(|| {
                self.run(
                    cwd,
                    &["search", project, "--limit", "5", "--format", "context"],
                    SHORT_TIMEOUT,
                )
            });
        if let Some(text) = search {
            parts.push(text);
        }
        parts
    }
}

/// `$CLAUDE_PLUGIN_ROOT/bin/<name>`, then `~/bin/<name>`, then `PATH`.
fn find_binary(env: &EngineEnv) -> Option<PathBuf> {
    let name = env.bin_name.as_deref().unwrap_or(DEFAULT_ENGINE_BIN);
    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(root) = &env.plugin_root {
        candidates.push(root.join("bin").join(name));
    }
    if let Some(home) = &env.home {
        candidates.push(home.join("bin").join(name));
    }
    if let Some(path_var) = &env.path_var {
        candidates.extend(std::env::split_paths(path_var).map(|dir| dir.join(name)));
    }
    let found = candidates.into_iter().find(|c| c.is_file());
    if found.is_none() {
        tracing::debug!(name, "memory engine binary not found");
    }
    found
}
