use std::path::{Component, Path, PathBuf};

use memsync_store::{MEMORY_DOC_FILENAME, STATE_ROOT_DIR};

/// Resolve `candidate` against `project_root` and fold `.`/`..` lexically.
///
/// Never touches the filesystem: deleted and renamed files must resolve too.
pub(crate) fn resolve(project_root: &Path, candidate: &str) -> PathBuf {
    let p = Path::new(candidate);
    let joined = if p.is_absolute() {
        p.to_path_buf()
    } else {
        project_root.join(p)
    };
    normalize_lexically(&joined)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether a resolved path belongs in the dirty set.
///
/// Rejects paths outside the project, anything under the state root
/// (`.claude/`, at any depth) and the generated memory document.
pub(crate) fn should_track(project_root: &Path, path: &Path) -> bool {
    let root = normalize_lexically(project_root);
    let Ok(relative) = path.strip_prefix(&root) else {
        return false;
    };
    if relative.as_os_str().is_empty() {
        return false;
    }
    if relative
        .components()
        .any(|c| c.as_os_str() == STATE_ROOT_DIR)
    {
        return false;
    }
    path.file_name()
        .map(|n| n != MEMORY_DOC_FILENAME)
        .unwrap_or(false)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_dots() {
        let root = Path::new("/proj");
        assert_eq!(resolve(root, "a.txt"), PathBuf::from("/proj/a.txt"));
        assert_eq!(resolve(root, "./src/../b.rs"), PathBuf::from("/proj/b.rs"));
        assert_eq!(resolve(root, "/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(resolve(root, "../other/x"), PathBuf::from("/other/x"));
        assert_eq!(resolve(Path::new("/"), "../../x"), PathBuf::from("/x"));
    }

    #[test]
    fn track_filter() {
        let root = Path::new("/proj");
        let cases = [
            ("/proj/src/main.rs", true),
            ("/proj/.claude/config.json", false),
            ("/proj/.claude/memsync/dirty-files", false),
            ("/proj/sub/.claude/settings.json", false),
            ("/proj/CLAUDE.md", false),
            ("/proj/sub/CLAUDE.md", false),
            ("/other/file.rs", false),
            ("/project-two/file.rs", false),
            ("/proj", false),
        ];
        for (path, want) in cases {
            assert_eq!(should_track(root, Path::new(path)), want, "{path}");
        }
    }

    #[test]
    fn track_filter_normalizes_root() {
        assert!(should_track(Path::new("/proj/./"), Path::new("/proj/a.rs")));
    }
}
