//! Remote-URL registry
//!
//! Remotes are metadata only: a name → URL mapping persisted as JSON at
//! `.dotgit/remotes`. No network transfer happens in the engine.

use crate::errors::RepoError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Remotes {
    #[serde(skip)]
    path: std::path::PathBuf,
    remotes: BTreeMap<String, String>,
}

impl Remotes {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Remotes {
                path: path.to_path_buf(),
                remotes: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read remotes at {:?}", path))?;
        let mut remotes: Remotes = serde_json::from_str(&content)
            .with_context(|| format!("malformed remotes registry at {:?}", path))?;
        remotes.path = path.to_path_buf();
        Ok(remotes)
    }

    pub fn add(&mut self, name: String, url: String) -> anyhow::Result<()> {
        if self.remotes.contains_key(&name) {
            return Err(
                RepoError::InvalidArgument(format!("remote {} already exists", name)).into(),
            );
        }
        self.remotes.insert(name, url);
        self.save()
    }

    pub fn remove(&mut self, name: &str) -> anyhow::Result<()> {
        if self.remotes.remove(name).is_none() {
            return Err(RepoError::InvalidArgument(format!("no such remote: {}", name)).into());
        }
        self.save()
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.remotes
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    fn save(&self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .with_context(|| format!("invalid remotes path {:?}", self.path))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .context("failed to create temporary remotes file")?;
        writeln!(temp, "{}", serde_json::to_string_pretty(&self)?)?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to write remotes at {:?}", self.path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_list_remove_round_trip() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("remotes");

        let mut remotes = Remotes::load(&path).unwrap();
        remotes
            .add("origin".into(), "https://example.com/repo".into())
            .unwrap();

        let reloaded = Remotes::load(&path).unwrap();
        assert_eq!(
            reloaded.list().collect::<Vec<_>>(),
            vec![("origin", "https://example.com/repo")]
        );

        let mut reloaded = reloaded;
        reloaded.remove("origin").unwrap();
        assert!(Remotes::load(&path).unwrap().list().next().is_none());
    }

    #[test]
    fn duplicate_and_missing_names_are_rejected() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("remotes");

        let mut remotes = Remotes::load(&path).unwrap();
        remotes.add("origin".into(), "url".into()).unwrap();

        assert!(remotes.add("origin".into(), "other".into()).is_err());
        assert!(remotes.remove("upstream").is_err());
    }
}
