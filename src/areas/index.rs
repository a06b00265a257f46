//! Staging index
//!
//! The index is the flat mapping describing what the next commit will
//! contain. It is persisted as a JSON document at `.dotgit/index` and every
//! read-modify-write cycle happens under the adjacent lock file, so
//! concurrent callers (including other processes) interleave safely.
//!
//! Entries survive a commit with their `staged` flag reset; that is what
//! lets change detection distinguish "edited after staging" from "edited
//! after committing".

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::index_entry::{FileStat, IndexEntry};
use crate::artifacts::index::lockfile::Lockfile;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeRecord};
use crate::errors::RepoError;
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// On-disk shape of the index document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexDocument {
    version: u32,
    entries: BTreeMap<String, IndexEntry>,
    #[serde(default)]
    conflicts: BTreeSet<String>,
}

/// Changes of the workspace relative to the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexChanges {
    /// Paths staged for the next commit
    pub staged: BTreeSet<String>,
    /// Paths edited in the workspace but not staged
    pub modified: BTreeSet<String>,
    /// Indexed paths missing from the workspace
    pub deleted: BTreeSet<String>,
    /// Workspace paths absent from the index (and not ignored)
    pub untracked: BTreeSet<String>,
}

impl IndexChanges {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
    }
}

/// The staging area.
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.dotgit/index`)
    path: Box<Path>,
    entries: BTreeMap<String, IndexEntry>,
    conflicts: BTreeSet<String>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            conflicts: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the index lock for a multi-step read-modify-write cycle.
    pub fn lock(&self) -> anyhow::Result<Lockfile> {
        Lockfile::acquire(&self.path)
    }

    /// Locked load: acquire, read, release.
    pub fn load(&mut self) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        self.read_from_disk()
    }

    /// Locked save: acquire, write atomically, release.
    pub fn save(&self) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        self.write_to_disk()
    }

    /// Read the document without taking the lock. Callers either hold the
    /// lock already or are inside `load`.
    pub fn read_from_disk(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.conflicts.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read index at {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(());
        }

        let document: IndexDocument =
            serde_json::from_str(&content).map_err(|_| RepoError::CorruptIndex)?;

        self.entries = document.entries;
        self.conflicts = document.conflicts;
        Ok(())
    }

    /// Write the document without taking the lock (temp file + rename).
    pub fn write_to_disk(&self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .with_context(|| format!("invalid index path {}", self.path.display()))?;
        std::fs::create_dir_all(parent)?;

        let document = IndexDocument {
            version: 1,
            entries: self.entries.clone(),
            conflicts: self.conflicts.clone(),
        };

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .context("Unable to create temporary index file")?;
        writeln!(temp, "{}", serde_json::to_string_pretty(&document)?)?;
        temp.persist(self.path.as_ref())
            .with_context(|| format!("Unable to write index at {}", self.path.display()))?;

        Ok(())
    }

    /// Stage content at a path: persist the blob first, then the entry.
    ///
    /// The whole cycle runs under the lock so concurrent stagers of other
    /// paths do not lose entries.
    pub fn stage(
        &mut self,
        database: &Database,
        path: String,
        content: Bytes,
        stat: &FileStat,
    ) -> anyhow::Result<ObjectId> {
        let blob = Blob::from_bytes(content);
        let oid = database.store(&blob)?;

        let _lock = self.lock()?;
        self.read_from_disk()?;
        self.entries
            .insert(path.clone(), IndexEntry::from_stat(oid.clone(), stat));
        self.conflicts.remove(&path);
        self.write_to_disk()?;

        debug!(path = %path, oid = %oid, "staged");
        Ok(oid)
    }

    /// Remove a path from the index. Returns whether it existed.
    pub fn unstage(&mut self, path: &str) -> anyhow::Result<bool> {
        let _lock = self.lock()?;
        self.read_from_disk()?;
        let existed = self.entries.remove(path).is_some();
        self.conflicts.remove(path);
        if existed {
            self.write_to_disk()?;
        }
        Ok(existed)
    }

    /// Drop every entry and persist the empty document.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        self.entries.clear();
        self.conflicts.clear();
        self.write_to_disk()
    }

    /// Build and persist a tree object from the current entries.
    pub fn write_tree(&self, database: &Database) -> anyhow::Result<ObjectId> {
        let mut tree = Tree::default();
        for (path, entry) in &self.entries {
            tree.insert(path.clone(), TreeRecord::new(entry.mode, entry.oid.clone()));
        }
        database.store(&tree)
    }

    /// Mark every entry as flushed into a commit.
    pub fn flush_staged_flags(&mut self) {
        for entry in self.entries.values_mut() {
            entry.staged = false;
        }
        self.conflicts.clear();
    }

    /// Replace all entries so the index mirrors the given tree.
    ///
    /// Used after checkout, merge, and reset. A workspace stat is recorded
    /// only when the file's bytes actually hash to the tree's blob;
    /// otherwise the entry carries a zeroed stat so the next change
    /// detection is forced to rehash instead of trusting a stale triple.
    pub fn replace_with_tree(&mut self, tree: &Tree, workspace: &Workspace) -> anyhow::Result<()> {
        self.entries.clear();
        self.conflicts.clear();

        for (path, record) in tree.entries() {
            let stat = match workspace.stat_file(path)? {
                Some(stat) => {
                    let blob = Blob::from_bytes(workspace.read_file(path)?);
                    if blob.object_id()? == record.oid {
                        stat
                    } else {
                        FileStat::default()
                    }
                }
                None => FileStat::default(),
            };

            let mut entry = IndexEntry::from_stat(record.oid.clone(), &stat);
            entry.mode = record.mode;
            entry.staged = false;
            self.entries.insert(path.clone(), entry);
        }

        Ok(())
    }

    pub fn entry(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert_entry(&mut self, path: String, entry: IndexEntry) {
        self.entries.insert(path, entry);
    }

    pub fn remove_entry(&mut self, path: &str) -> bool {
        self.conflicts.remove(path);
        self.entries.remove(path).is_some()
    }

    pub fn mark_conflict(&mut self, path: String) {
        self.conflicts.insert(path);
    }

    pub fn conflicts(&self) -> &BTreeSet<String> {
        &self.conflicts
    }

    /// Reconcile the workspace against the index.
    ///
    /// For each indexed path the stat triple is compared first; only a
    /// mismatch (or a zeroed stat) forces rehashing the file, so the fast
    /// path cannot hide an edit. Untracked paths come from a full workspace
    /// walk that skips the control directory and ignored files.
    pub fn changes(&self, workspace: &Workspace) -> anyhow::Result<IndexChanges> {
        let mut changes = IndexChanges::default();

        for (path, entry) in &self.entries {
            match workspace.stat_file(path)? {
                None => {
                    changes.deleted.insert(path.clone());
                }
                Some(stat) => {
                    let same_content = if entry.stat_match(&stat) {
                        true
                    } else {
                        let blob = Blob::from_bytes(workspace.read_file(path)?);
                        blob.object_id()? == entry.oid
                    };

                    match (same_content, entry.staged) {
                        (_, true) => {
                            changes.staged.insert(path.clone());
                        }
                        (false, false) => {
                            changes.modified.insert(path.clone());
                        }
                        (true, false) => {}
                    }
                }
            }
        }

        for path in workspace.list_files()? {
            if !self.entries.contains_key(&path) {
                changes.untracked.insert(path);
            }
        }

        Ok(changes)
    }
}
