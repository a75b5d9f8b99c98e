use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use memsync_core::{Error, Result};

use crate::StatePaths;

/// Once-per-session gate for the turn-end blocking decision.
///
/// The marker file's existence means the gate already fired in this session.
#[derive(Debug, Clone)]
pub struct StopLatch {
    path: PathBuf,
}

impl StopLatch {
    pub fn new(paths: &StatePaths, session_id: &str) -> Self {
        Self {
            path: paths.latch_file(session_id),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Returns `true` exactly once per session: the call that sets the latch.
    ///
    /// If the marker cannot be written the call still returns `true`, so this
    /// invocation evaluates in memory even though the latch will not persist.
    pub fn try_fire(&self) -> bool {
        match create_marker(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => false,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stop latch not persisted; evaluating without it"
                );
                true
            }
        }
    }

    /// Remove the marker (session teardown). Missing marker is fine.
    pub fn reset(&self) -> Result<()> {
        remove_marker(&self.path)
    }

    /// Remove every session's marker. Returns how many were removed.
    pub fn reset_all(paths: &StatePaths) -> Result<usize> {
        let files = paths.latch_files();
        for f in &files {
            remove_marker(f)?;
        }
        Ok(files.len())
    }
}

fn create_marker(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_| ())
}

fn remove_marker(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_session() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StatePaths::discover(tmp.path());
        let latch = StopLatch::new(&paths, "s1");

        assert!(!latch.is_set());
        assert!(latch.try_fire());
        assert!(latch.is_set());
        assert!(!latch.try_fire());
        assert!(!latch.try_fire());
    }

    #[test]
    fn sessions_are_independent() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StatePaths::discover(tmp.path());
        assert!(StopLatch::new(&paths, "s1").try_fire());
        assert!(StopLatch::new(&paths, "s2").try_fire());
        assert!(!StopLatch::new(&paths, "s1").try_fire());
    }

    #[test]
    fn reset_rearms() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StatePaths::discover(tmp.path());
        let latch = StopLatch::new(&paths, "s1");
        assert!(latch.try_fire());
        latch.reset().unwrap();
        latch.reset().unwrap();
        assert!(latch.try_fire());
    }

    #[test]
    fn reset_all_removes_every_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StatePaths::discover(tmp.path());
        StopLatch::new(&paths, "a").try_fire();
        StopLatch::new(&paths, "b").try_fire();
        assert_eq!(StopLatch::reset_all(&paths).unwrap(), 2);
        assert!(paths.latch_files().is_empty());
    }

    #[test]
    fn unwritable_state_dir_still_fires() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the `.claude` directory should be.
        fs::write(tmp.path().join(".claude"), b"").unwrap();
        let paths = StatePaths::discover(tmp.path());
        let latch = StopLatch::new(&paths, "s1");
        assert!(latch.try_fire());
        assert!(latch.try_fire());
        assert!(!latch.is_set());
    }
}
