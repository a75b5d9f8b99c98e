use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Maximum number of characters of a shell command kept in a session event.
pub const COMMAND_SUMMARY_MAX_CHARS: usize = 200;

/// The commit that produced a set of dirty entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitContext {
    /// Short commit hash (`git log --format=%h`).
    pub hash: String,
    /// Commit subject line.
    pub message: String,
}

impl CommitContext {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
        }
    }
}

/// One touched artifact in the dirty set. `path` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyEntry {
    pub path: String,
    pub commit: Option<CommitContext>,
}

impl DirtyEntry {
    /// A context-less entry (edit, shell mutation, direct file).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            commit: None,
        }
    }

    /// An entry produced by a git commit.
    pub fn with_commit(path: impl Into<String>, commit: CommitContext) -> Self {
        Self {
            path: path.into(),
            commit: Some(commit),
        }
    }

    /// Fold a later write for the same path into this entry.
    ///
    /// Commit context replaces whatever was there; a context-less write
    /// never clears an attached context.
    pub fn absorb(&mut self, later: DirtyEntry) {
        debug_assert_eq!(self.path, later.path);
        if later.commit.is_some() {
            self.commit = later.commit;
        }
    }

    /// Serialize as one dirty-set line: `<path>` or `<path> [<hash>: <message>]`.
    pub fn to_line(&self) -> String {
        match &self.commit {
            Some(c) => {
                let message = c.message.replace(['\n', '\r'], " ");
                format!("{} [{}: {}]", self.path, c.hash, message)
            }
            None => self.path.clone(),
        }
    }

    /// Parse one dirty-set line. Returns `None` for blank or corrupt lines.
    ///
    /// Only a trailing ` [<hash>: <message>]` with an alphanumeric hash is
    /// read as commit context; any other bracketed text is part of the path.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let entry = match split_commit_suffix(line) {
            Some((path, commit)) => DirtyEntry::with_commit(path, commit),
            None => DirtyEntry::new(line),
        };
        if !Path::new(&entry.path).is_absolute() {
            return None;
        }
        Some(entry)
    }
}

fn split_commit_suffix(line: &str) -> Option<(&str, CommitContext)> {
    let body = line.strip_suffix(']')?;
    body.match_indices(" [").find_map(|(idx, marker)| {
        let inner = &body[idx + marker.len()..];
        let (hash, message) = inner.split_once(": ").or_else(|| {
            // `git log --format=%h %s` on an empty subject
            inner.strip_suffix(':').map(|h| (h, ""))
        })?;
        let is_hash = !hash.is_empty() && hash.chars().all(|c| c.is_ascii_alphanumeric());
        is_hash.then(|| (&line[..idx], CommitContext::new(hash, message)))
    })
}

impl fmt::Display for DirtyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// One line of the session event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub tool_name: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl SessionEvent {
    /// New event stamped with the current UTC time.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            timestamp: now_rfc3339(),
            file_path: None,
            command: None,
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Attach a command summary, truncated to [`COMMAND_SUMMARY_MAX_CHARS`].
    pub fn with_command(mut self, command: &str) -> Self {
        self.command = Some(truncate_chars(command, COMMAND_SUMMARY_MAX_CHARS));
        self
    }
}

/// Truncate to at most `max` chars without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
