use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use memsync_core::{DirtyEntry, Result};

use crate::{truncate_file, try_lock, write_atomic, StatePaths};

/// Maximum number of entries surfaced by [`DirtySetStore::read_and_clear`].
pub const REPORT_CAP: usize = 20;

/// Deduplicating, path-sorted set of touched files backed by `dirty-files`.
///
/// Storage is uncapped; the cap applies only to what `read_and_clear`
/// reports.
#[derive(Debug, Clone)]
pub struct DirtySetStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl DirtySetStore {
    pub fn new(paths: &StatePaths) -> Self {
        Self {
            path: paths.dirty_files.clone(),
            lock_path: paths.lock_file.clone(),
        }
    }

    /// Load the current set. Missing file → empty; corrupt lines are skipped.
    pub fn load(&self) -> BTreeMap<String, DirtyEntry> {
        let mut set = BTreeMap::new();
        let Ok(content) = fs::read_to_string(&self.path) else {
            return set;
        };
        for line in content.lines() {
            match DirtyEntry::parse_line(line) {
                Some(entry) => insert(&mut set, entry),
                None if line.trim().is_empty() => {}
                None => tracing::debug!(line, "skipping corrupt dirty-set line"),
            }
        }
        set
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> Vec<DirtyEntry> {
        self.load().into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    /// Merge entries into the stored set and write it back.
    ///
    /// Idempotent. Returns the size of the set after the merge.
    pub fn merge(&self, entries: impl IntoIterator<Item = DirtyEntry>) -> Result<usize> {
        let _guard = try_lock(&self.lock_path);
        let mut set = self.load();
        for entry in entries {
            insert(&mut set, entry);
        }
        let mut out = String::new();
        for entry in set.values() {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        write_atomic(&self.path, out.as_bytes())?;
        Ok(set.len())
    }

    /// Return the first [`REPORT_CAP`] entries by path and empty the store.
    pub fn read_and_clear(&self) -> Result<Vec<DirtyEntry>> {
        let _guard = try_lock(&self.lock_path);
        let set = self.load();
        truncate_file(&self.path)?;
        Ok(set.into_values().take(REPORT_CAP).collect())
    }

    /// Empty the store without reading it.
    pub fn clear(&self) -> Result<()> {
        let _guard = try_lock(&self.lock_path);
        truncate_file(&self.path)
    }
}

fn insert(set: &mut BTreeMap<String, DirtyEntry>, entry: DirtyEntry) {
    match set.entry(entry.path.clone()) {
        Entry::Occupied(mut existing) => existing.get_mut().absorb(entry),
        Entry::Vacant(slot) => {
            slot.insert(entry);
        }
    }
}
