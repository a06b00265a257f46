//! Configuration store
//!
//! Structured settings organized as section → key → value, persisted as a
//! JSON document at `.dotgit/config`. The document is loaded on demand and
//! rewritten in full (atomically) after any mutation.
//!
//! Missing files synthesize the default sections, so a freshly initialized
//! repository always answers `branch.default`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default branch name used by `init` when nothing overrides it.
pub const DEFAULT_BRANCH: &str = "main";

type Sections = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    sections: Sections,
}

impl Config {
    /// Load the config document, synthesizing defaults when the file is
    /// absent or a section is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config at {:?}", path))?;
            let mut config: Config = serde_json::from_str(&content)
                .with_context(|| format!("malformed config at {:?}", path))?;
            config.path = path.to_path_buf();
            config
        } else {
            Config {
                path: path.to_path_buf(),
                sections: Sections::new(),
            }
        };

        config.ensure_defaults();
        Ok(config)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Set a value and persist the full document.
    pub fn set(&mut self, section: &str, key: &str, value: String) -> anyhow::Result<()> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.save()
    }

    /// Remove a key, dropping its section when it becomes empty, and persist.
    ///
    /// Returns whether the key existed.
    pub fn unset(&mut self, section: &str, key: &str) -> anyhow::Result<bool> {
        let existed = match self.sections.get_mut(section) {
            Some(keys) => keys.remove(key).is_some(),
            None => false,
        };

        let section_empty = self
            .sections
            .get(section)
            .is_some_and(|keys| keys.is_empty());
        if section_empty {
            self.sections.remove(section);
        }

        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    /// All `(section, key, value)` triples, for `config --list`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sections.iter().flat_map(|(section, keys)| {
            keys.iter()
                .map(move |(key, value)| (section.as_str(), key.as_str(), value.as_str()))
        })
    }

    /// Configured default branch name.
    pub fn default_branch(&self) -> String {
        self.get("branch", "default")
            .unwrap_or(DEFAULT_BRANCH)
            .to_string()
    }

    /// Unified-diff context width (`diff.context`, default 3).
    pub fn diff_context(&self) -> usize {
        self.get("diff", "context")
            .and_then(|v| v.parse().ok())
            .unwrap_or(3)
    }

    /// Whether diff output should carry ANSI colors (`diff.color = always`).
    pub fn diff_color(&self) -> bool {
        self.get("diff", "color") == Some("always")
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .with_context(|| format!("invalid config path {:?}", self.path))?;
        std::fs::create_dir_all(parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .context("failed to create temporary config file")?;
        let content = serde_json::to_string_pretty(&self)?;
        writeln!(temp, "{}", content)?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to write config at {:?}", self.path))?;

        Ok(())
    }

    fn ensure_defaults(&mut self) {
        for section in ["core", "user", "merge", "diff"] {
            self.sections.entry(section.to_string()).or_default();
        }
        self.sections
            .entry("branch".to_string())
            .or_default()
            .entry("default".to_string())
            .or_insert_with(|| DEFAULT_BRANCH.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> (assert_fs::TempDir, Config) {
        let dir = assert_fs::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config")).unwrap();
        (dir, config)
    }

    #[test]
    fn first_load_synthesizes_defaults() {
        let (_dir, config) = config();
        assert_eq!(config.default_branch(), "main");
        assert_eq!(config.diff_context(), 3);
        assert!(!config.diff_color());
    }

    #[test]
    fn set_persists_and_reloads() {
        let (dir, mut config) = config();
        config
            .set("user", "name", "Ada Lovelace".to_string())
            .unwrap();

        let reloaded = Config::load(&dir.path().join("config")).unwrap();
        assert_eq!(reloaded.get("user", "name"), Some("Ada Lovelace"));
    }

    #[test]
    fn unset_drops_empty_sections() {
        let (_dir, mut config) = config();
        config.set("remote", "origin", "x".to_string()).unwrap();

        assert!(config.unset("remote", "origin").unwrap());
        assert!(!config.unset("remote", "origin").unwrap());
        assert!(config.entries().all(|(section, _, _)| section != "remote"));
    }
}
