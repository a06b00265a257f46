//! Workspace migration plan
//!
//! Moving the workspace from one snapshot to another is planned as three
//! ordered action sets: deletions first (file removal prunes emptied
//! directories), then updates, then creations. The plan also knows which
//! locally-changed paths it would clobber, which is what the
//! dirty-workspace refusal is built on.

use crate::areas::database::Database;
use crate::areas::index::IndexChanges;
use crate::areas::workspace::Workspace;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::artifacts::objects::tree::TreeRecord;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Migration {
    delete: BTreeSet<String>,
    update: BTreeMap<String, TreeRecord>,
    create: BTreeMap<String, TreeRecord>,
}

impl Migration {
    /// Plan the move implied by a snapshot diff (old = current, new = target).
    pub fn plan(diff: &TreeDiff) -> Self {
        Migration {
            delete: diff.deleted.keys().cloned().collect(),
            update: diff
                .modified
                .iter()
                .map(|(path, entry)| (path.clone(), entry.new.clone()))
                .collect(),
            create: diff.added.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.create.is_empty()
    }

    /// Paths this migration touches.
    pub fn touched_paths(&self) -> impl Iterator<Item = &String> {
        self.delete
            .iter()
            .chain(self.update.keys())
            .chain(self.create.keys())
    }

    /// Locally-changed paths the migration would overwrite or remove.
    ///
    /// Uncommitted edits (staged or not), deletions, and untracked files that
    /// collide with an incoming path all count.
    pub fn clobbered_paths(&self, changes: &IndexChanges) -> Vec<String> {
        self.touched_paths()
            .filter(|path| {
                changes.staged.contains(*path)
                    || changes.modified.contains(*path)
                    || changes.deleted.contains(*path)
                    || (changes.untracked.contains(*path)
                        && (self.create.contains_key(*path) || self.update.contains_key(*path)))
            })
            .cloned()
            .collect()
    }

    /// Apply the plan to the workspace.
    ///
    /// Deletions run first so directory replacements see a clean slate;
    /// creations run last.
    pub fn apply(&self, workspace: &Workspace, database: &Database) -> anyhow::Result<()> {
        for path in &self.delete {
            debug!(path = %path, "migration delete");
            workspace.remove_file(path)?;
        }

        for (path, record) in self.update.iter().chain(self.create.iter()) {
            debug!(path = %path, oid = %record.oid, "migration write");
            let blob = database
                .parse_object_as_blob(&record.oid)?
                .ok_or_else(|| anyhow::anyhow!("tree entry {} is not a blob", record.oid))?;
            workspace.write_file(path, blob.content(), record.mode)?;
        }

        Ok(())
    }
}
