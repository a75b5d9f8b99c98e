use std::fs;
use std::io::Write;
use std::path::PathBuf;

use memsync_core::{Error, Result, SessionEvent};

use crate::{truncate_file, StatePaths};

/// Maximum number of events consumed by the turn gate.
pub const EVENT_CAP: usize = 50;

/// Append-only JSON-lines log of recorded tool calls (`session-events`).
#[derive(Debug, Clone)]
pub struct SessionEventLog {
    path: PathBuf,
}

impl SessionEventLog {
    pub fn new(paths: &StatePaths) -> Self {
        Self {
            path: paths.session_events.clone(),
        }
    }

    /// Append one event, creating the state directory if needed.
    pub fn append(&self, event: &SessionEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let line = serde_json::to_string(event)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }

    /// Every well-formed event in arrival order. Malformed lines are skipped.
    pub fn read_all(&self) -> Vec<SessionEvent> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the `cap` most recent events, oldest first, and empty the log.
    pub fn read_and_clear(&self, cap: usize) -> Result<Vec<SessionEvent>> {
        let mut events = self.read_all();
        truncate_file(&self.path)?;
        if events.len() > cap {
            events.drain(..events.len() - cap);
        }
        Ok(events)
    }

    pub fn clear(&self) -> Result<()> {
        truncate_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> (tempfile::TempDir, SessionEventLog, StatePaths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StatePaths::discover(tmp.path());
        (tmp, SessionEventLog::new(&paths), paths)
    }

    #[test]
    fn append_creates_state_dir() {
        let (_tmp, log, paths) = log();
        assert!(!paths.state_dir.exists());
        log.append(&SessionEvent::new("Edit").with_file_path("/p/a.rs"))
            .unwrap();
        assert!(paths.session_events.exists());
        let events = log.read_all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tool_name, "Edit");
        assert_eq!(events[0].file_path.as_deref(), Some("/p/a.rs"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (_tmp, log, paths) = log();
        paths.ensure_layout().unwrap();
        fs::write(
            &paths.session_events,
            "{\"toolName\":\"Edit\"}\n{broken\n\n{\"noTool\":1}\n{\"toolName\":\"Bash\",\"command\":\"rm x\"}\n",
        )
        .unwrap();
        let names: Vec<String> = log.read_all().into_iter().map(|e| e.tool_name).collect();
        assert_eq!(names, vec!["Edit", "Bash"]);
    }

    #[test]
    fn read_and_clear_keeps_most_recent_in_order() {
        let (_tmp, log, _) = log();
        for i in 0..60 {
            log.append(&SessionEvent::new(format!("T{i}"))).unwrap();
        }
        let events = log.read_and_clear(EVENT_CAP).unwrap();
        assert_eq!(events.len(), EVENT_CAP);
        assert_eq!(events.first().unwrap().tool_name, "T10");
        assert_eq!(events.last().unwrap().tool_name, "T59");

        assert!(log.is_empty());
        assert!(log.read_and_clear(EVENT_CAP).unwrap().is_empty());
    }

    #[test]
    fn read_and_clear_under_cap_returns_all() {
        let (_tmp, log, _) = log();
        log.append(&SessionEvent::new("A")).unwrap();
        log.append(&SessionEvent::new("B")).unwrap();
        let names: Vec<String> = log
            .read_and_clear(EVENT_CAP)
            .unwrap()
            .into_iter()
            .map(|e| e.tool_name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
