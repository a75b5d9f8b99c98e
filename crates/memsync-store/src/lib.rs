//! Project-local state for memsync hooks.
//!
//! Every hook run is its own short-lived process, so all state lives in
//! files under `<project>/.claude/memsync/`:
//!
//! ```text
//! dirty-files              one tracked path per line
//! session-events           JSON lines, one per recorded tool call
//! stop-prompted.<session>  latch marker, exists once the turn gate fired
//! config.json              {"triggerMode": "default" | "gitmode"}
//! .lock                    advisory lock for dirty-set rewrites
//! ```

mod dirty;
mod events;
mod latch;

pub use dirty::{DirtySetStore, REPORT_CAP};
pub use events::{SessionEventLog, EVENT_CAP};
pub use latch::StopLatch;

use fs2::FileExt;
use memsync_core::{Error, MemsyncConfig, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level directory (relative to the project root) that holds host and
/// memsync state. Paths under it are never tracked.
pub const STATE_ROOT_DIR: &str = ".claude";

/// memsync's own directory inside [`STATE_ROOT_DIR`].
pub const STATE_DIR_NAME: &str = "memsync";

/// The generated memory document; edits to it are never tracked.
pub const MEMORY_DOC_FILENAME: &str = "CLAUDE.md";

const LATCH_PREFIX: &str = "stop-prompted.";

/// All well-known paths under `.claude/memsync/`.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub dirty_files: PathBuf,
    pub session_events: PathBuf,
    pub config_json: PathBuf,
    pub lock_file: PathBuf,
}

impl StatePaths {
    /// Derive all paths from a project root. Pure computation, no I/O.
    pub fn discover(project_root: impl Into<PathBuf>) -> Self {
        let root = project_root.into();
        let state_dir = root.join(STATE_ROOT_DIR).join(STATE_DIR_NAME);
        Self {
            dirty_files: state_dir.join("dirty-files"),
            session_events: state_dir.join("session-events"),
            config_json: state_dir.join("config.json"),
            lock_file: state_dir.join(".lock"),
            state_dir,
            root,
        }
    }

    /// Create the state directory. Idempotent.
    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.state_dir).map_err(|e| Error::io(&self.state_dir, e))
    }

    /// Latch marker for one session.
    pub fn latch_file(&self, session_id: &str) -> PathBuf {
        self.state_dir
            .join(format!("{LATCH_PREFIX}{}", sanitize_session_id(session_id)))
    }

    /// All latch markers currently on disk.
    pub fn latch_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.state_dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(LATCH_PREFIX))
            .map(|e| e.path())
            .collect();
        files.sort();
        files
    }

    /// Project display name: the root directory's base name.
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

/// Map a host session id onto a safe file-name component.
///
/// ASCII alphanumerics and `-` pass through; every other byte becomes
/// `_xx` (lowercase hex), so distinct ids never share a marker. Surrounding
/// whitespace is ignored and missing ids share the `default` latch.
fn sanitize_session_id(session_id: &str) -> String {
    let trimmed = session_id.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for b in trimmed.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("_{b:02x}"));
        }
    }
    out
}

/// Load `config.json`. Missing or malformed files yield the defaults.
pub fn load_config(paths: &StatePaths) -> MemsyncConfig {
    fs::read_to_string(&paths.config_json)
        .map(|s| MemsyncConfig::from_json_str(&s))
        .unwrap_or_default()
}

/// Write `config.json` atomically.
pub fn save_config(paths: &StatePaths, config: &MemsyncConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    write_atomic(&paths.config_json, json.as_bytes())
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?;
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Truncate a file to empty. A missing file is already empty.
pub(crate) fn truncate_file(path: &Path) -> Result<()> {
    match fs::OpenOptions::new().write(true).truncate(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// File-based exclusive lock guard.
pub struct LockGuard {
    _file: fs::File,
}

/// Acquire an exclusive file lock. Creates the lock file if needed.
pub fn lock_file(path: &Path) -> Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.lock_exclusive().map_err(|e| Error::io(path, e))?;
    Ok(LockGuard { _file: file })
}

/// Best-effort lock: hooks proceed unlocked rather than fail.
pub(crate) fn try_lock(path: &Path) -> Option<LockGuard> {
    match lock_file(path) {
        Ok(guard) => Some(guard),
        Err(e) => {
            tracing::debug!(error = %e, "proceeding without state lock");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memsync_core::TriggerMode;

    #[test]
    fn discover_builds_correct_paths() {
        let p = StatePaths::discover("/tmp/repo");
        assert_eq!(p.state_dir, PathBuf::from("/tmp/repo/.claude/memsync"));
        assert_eq!(
            p.dirty_files,
            PathBuf::from("/tmp/repo/.claude/memsync/dirty-files")
        );
        assert_eq!(
            p.session_events,
            PathBuf::from("/tmp/repo/.claude/memsync/session-events")
        );
        assert_eq!(
            p.config_json,
            PathBuf::from("/tmp/repo/.claude/memsync/config.json")
        );
        assert_eq!(p.project_name(), "repo");
    }

    #[test]
    fn latch_file_sanitizes_session_id() {
        let p = StatePaths::discover("/tmp/repo");
        assert_eq!(
            p.latch_file("abc-123"),
            PathBuf::from("/tmp/repo/.claude/memsync/stop-prompted.abc-123")
        );
        assert_eq!(
            p.latch_file("../evil"),
            PathBuf::from("/tmp/repo/.claude/memsync/stop-prompted._2e_2e_2fevil")
        );
        assert_eq!(
            p.latch_file(""),
            PathBuf::from("/tmp/repo/.claude/memsync/stop-prompted.default")
        );
    }

    #[test]
    fn distinct_session_ids_get_distinct_latches() {
        let p = StatePaths::discover("/tmp/repo");
        assert_ne!(p.latch_file("a.b"), p.latch_file("a_b"));
        assert_ne!(p.latch_file("a_2eb"), p.latch_file("a.b"));
        assert_eq!(p.latch_file(" s1 "), p.latch_file("s1"));
        assert!(p.latch_file("a_b").ends_with("stop-prompted.a_5fb"));
    }

    #[test]
    fn config_defaults_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let p = StatePaths::discover(tmp.path());
        assert_eq!(load_config(&p).trigger_mode, TriggerMode::Default);
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let p = StatePaths::discover(tmp.path());
        let cfg = MemsyncConfig {
            trigger_mode: TriggerMode::Gitmode,
            ..Default::default()
        };
        save_config(&p, &cfg).unwrap();
        assert_eq!(load_config(&p).trigger_mode, TriggerMode::Gitmode);
    }

    #[test]
    fn write_atomic_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("test.txt");
        write_atomic(&path, b"hello world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn truncate_missing_file_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        truncate_file(&tmp.path().join("absent")).unwrap();
        assert!(!tmp.path().join("absent").exists());
    }

    #[test]
    fn lock_file_acquires_and_drops() {
        let tmp = tempfile::tempdir().unwrap();
        let lock_path = tmp.path().join("test.lock");
        let guard = lock_file(&lock_path).unwrap();
        assert!(lock_path.exists());
        drop(guard);
    }
}
