use memsync_store::{DirtySetStore, SessionEventLog, StatePaths, StopLatch};
use std::path::Path;

/// `memsync reset [--session <id>]`
///
/// Clears both buffers. With `--session` only that session's gate is
/// re-armed; otherwise every gate marker is removed.
pub fn execute(repo_root: &Path, session: Option<&str>) -> anyhow::Result<()> {
    let paths = StatePaths::discover(repo_root);
    let dirty = DirtySetStore::new(&paths);
    let dropped = dirty.len();
    dirty.clear()?;
    SessionEventLog::new(&paths).clear()?;

    let gates = match session {
        Some(sid) => {
            let latch = StopLatch::new(&paths, sid);
            let was_set = latch.is_set();
            latch.reset()?;
            usize::from(was_set)
        }
        None => StopLatch::reset_all(&paths)?,
    };
    println!("Cleared {dropped} tracked files and {gates} gate markers.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memsync_core::{DirtyEntry, SessionEvent};

    fn seed(root: &Path) -> StatePaths {
        let paths = StatePaths::discover(root);
        DirtySetStore::new(&paths)
            .merge([DirtyEntry::new(root.join("a.rs").to_string_lossy().to_string())])
            .unwrap();
        SessionEventLog::new(&paths)
            .append(&SessionEvent::new("Edit"))
            .unwrap();
        StopLatch::new(&paths, "s1").try_fire();
        StopLatch::new(&paths, "s2").try_fire();
        paths
    }

    #[test]
    fn reset_clears_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = seed(tmp.path());
        execute(tmp.path(), None).unwrap();
        assert!(DirtySetStore::new(&paths).is_empty());
        assert!(SessionEventLog::new(&paths).is_empty());
        assert!(paths.latch_files().is_empty());
    }

    #[test]
    fn reset_session_keeps_other_gates() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = seed(tmp.path());
        execute(tmp.path(), Some("s1")).unwrap();
        assert!(!StopLatch::new(&paths, "s1").is_set());
        assert!(StopLatch::new(&paths, "s2").is_set());
        assert!(DirtySetStore::new(&paths).is_empty());
    }

    #[test]
    fn reset_on_fresh_project_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        execute(tmp.path(), None).unwrap();
    }
}
