//! Working directory operations
//!
//! The workspace is everything under the repository root except the control
//! directory. Paths handed to the rest of the engine are always relative,
//! forward-slash separated, and canonical (no `.` or `..` segments).
//!
//! File reads are byte-exact; the workspace never normalizes line endings
//! or re-encodes content.

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::FileStat;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the control directory at the workspace root
pub const CONTROL_DIR: &str = ".dotgit";

/// Name of the optional ignore-patterns file at the workspace root
pub const IGNORE_FILE: &str = ".dotgitignore";

/// Ignore predicate consumed by workspace walks.
///
/// Built from default rules (the control directory itself, editor backup
/// files) plus the optional patterns file. Pattern evaluation is
/// deliberately small: a pattern matches a whole path component, a
/// `*.suffix` pattern matches file names, and a trailing `/` anchors the
/// pattern to directories.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<String>,
}

impl IgnoreRules {
    pub fn load(root: &Path) -> Self {
        let mut patterns = Vec::new();

        let ignore_file = root.join(IGNORE_FILE);
        if let Ok(content) = std::fs::read_to_string(&ignore_file) {
            patterns.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        }

        IgnoreRules { patterns }
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        let components: Vec<&str> = rel_path.split('/').collect();
        let file_name = components.last().copied().unwrap_or_default();

        // Default rules: the control directory and editor backups.
        if components.first() == Some(&CONTROL_DIR) {
            return true;
        }
        if file_name.ends_with('~') || file_name.ends_with(".swp") {
            return true;
        }

        self.patterns.iter().any(|pattern| {
            let pattern = pattern.strip_suffix('/').unwrap_or(pattern);
            if let Some(suffix) = pattern.strip_prefix('*') {
                file_name.ends_with(suffix)
            } else {
                components.contains(&pattern)
            }
        })
    }
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    ignore: IgnoreRules,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        let ignore = IgnoreRules::load(&path);
        Workspace { path, ignore }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.ignore.is_ignored(rel_path)
    }

    /// All non-ignored files in the workspace, sorted by path.
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path).into_iter().filter_entry(|entry| {
            entry.file_name().to_string_lossy() != CONTROL_DIR
        });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = self.relativize(entry.path())
                && !self.ignore.is_ignored(&rel)
            {
                files.push(rel);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Expand a user-supplied path argument into matching workspace files.
    ///
    /// Accepts `.` (everything), directories (their files), plain files, and
    /// `*`-wildcards matched against the full relative path. Paths that match
    /// nothing expand to an empty set.
    pub fn expand_path(&self, raw: &str) -> anyhow::Result<Vec<String>> {
        if raw == "." {
            return self.list_files();
        }

        if raw.contains('*') {
            let all = self.list_files()?;
            return Ok(all
                .into_iter()
                .filter(|path| wildcard_match(raw, path))
                .collect());
        }

        let absolute = self.path.join(raw);
        if absolute.is_dir() {
            let prefix = format!("{}/", raw.trim_end_matches('/'));
            let all = self.list_files()?;
            return Ok(all
                .into_iter()
                .filter(|path| path.starts_with(&prefix))
                .collect());
        }

        if absolute.is_file() {
            if let Some(rel) = self.relativize(&absolute)
                && !self.ignore.is_ignored(&rel)
            {
                return Ok(vec![rel]);
            }
        }

        Ok(Vec::new())
    }

    /// Read a file's bytes exactly as stored.
    pub fn read_file(&self, rel_path: &str) -> anyhow::Result<Bytes> {
        let path = self.path.join(rel_path);
        let content = std::fs::read(&path)
            .with_context(|| format!("Unable to read file {}", path.display()))?;
        Ok(Bytes::from(content))
    }

    /// Stat a file; `None` when it does not exist.
    pub fn stat_file(&self, rel_path: &str) -> anyhow::Result<Option<FileStat>> {
        let path = self.path.join(rel_path);

        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {
                Ok(Some(FileStat::try_from((path.as_path(), &metadata))?))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Unable to stat {}", path.display())),
        }
    }

    /// Write a file, creating parent directories and applying the mode.
    pub fn write_file(&self, rel_path: &str, content: &[u8], mode: FileMode) -> anyhow::Result<()> {
        let path = self.path.join(rel_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Unable to write file {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode_bits = if mode.is_executable() { 0o755 } else { 0o644 };
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode_bits))
                .with_context(|| format!("Unable to set permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    /// Remove a file and any directories the removal empties.
    pub fn remove_file(&self, rel_path: &str) -> anyhow::Result<()> {
        let path = self.path.join(rel_path);

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Unable to remove file {}", path.display()));
            }
        }

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() {
                break;
            }
            match dir.read_dir() {
                Ok(mut entries) => {
                    if entries.next().is_none() {
                        std::fs::remove_dir(dir).ok();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
            parent = dir.parent();
        }

        Ok(())
    }

    /// Turn an absolute path under the root into the canonical relative form.
    fn relativize(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(self.path.as_ref()).ok()?;
        normalize_rel(rel)
    }
}

/// Canonical relative form: forward slashes, normal components only.
pub fn normalize_rel(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Relative string back to a host path.
pub fn rel_to_path(rel: &str) -> PathBuf {
    rel.split('/').collect()
}

fn wildcard_match(pattern: &str, path: &str) -> bool {
    // Single-`*` patterns only; enough for `*.txt` and `src/*`.
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            path.len() >= prefix.len() + suffix.len()
                && path.starts_with(prefix)
                && path.ends_with(suffix)
        }
        None => pattern == path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(dir: &assert_fs::TempDir) -> Workspace {
        Workspace::new(dir.path().to_path_buf().into_boxed_path())
    }

    #[test]
    fn walk_skips_control_directory_and_backups() {
        let dir = assert_fs::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".dotgit/objects")).unwrap();
        std::fs::write(dir.path().join(".dotgit/objects/x"), "o").unwrap();
        std::fs::write(dir.path().join("kept.txt"), "k").unwrap();
        std::fs::write(dir.path().join("draft.txt~"), "b").unwrap();

        let files = workspace(&dir).list_files().unwrap();
        assert_eq!(files, vec!["kept.txt".to_string()]);
    }

    #[test]
    fn ignore_file_patterns_apply() {
        let dir = assert_fs::TempDir::new().unwrap();
        std::fs::write(dir.path().join(IGNORE_FILE), "target\n*.log\n").unwrap();
        std::fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        std::fs::write(dir.path().join("target/debug/out"), "o").unwrap();
        std::fs::write(dir.path().join("build.log"), "l").unwrap();
        std::fs::write(dir.path().join("main.rs"), "m").unwrap();

        let ws = workspace(&dir);
        let files = ws.list_files().unwrap();
        assert!(files.contains(&IGNORE_FILE.to_string()));
        assert!(files.contains(&"main.rs".to_string()));
        assert!(!files.iter().any(|f| f.starts_with("target/")));
        assert!(!files.contains(&"build.log".to_string()));
    }

    #[test]
    fn expand_path_handles_directories_and_wildcards() {
        let dir = assert_fs::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.rs"), "a").unwrap();
        std::fs::write(dir.path().join("src/b.rs"), "b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "n").unwrap();

        let ws = workspace(&dir);
        assert_eq!(
            ws.expand_path("src").unwrap(),
            vec!["src/a.rs".to_string(), "src/b.rs".to_string()]
        );
        assert_eq!(ws.expand_path("*.txt").unwrap(), vec!["notes.txt".to_string()]);
        assert!(ws.expand_path("missing.txt").unwrap().is_empty());
    }

    #[test]
    fn read_preserves_bytes_exactly() {
        let dir = assert_fs::TempDir::new().unwrap();
        let payload = [0u8, 13, 10, 255, 0];
        std::fs::write(dir.path().join("bin.dat"), payload).unwrap();

        let content = workspace(&dir).read_file("bin.dat").unwrap();
        assert_eq!(content.as_ref(), payload);
    }
}
