//! Status computation and formatting
//!
//! The staged sets compare the index against HEAD's tree; the unstaged sets
//! compare the workspace against the index; untracked paths come from the
//! workspace walk; conflict paths are those the index marks while a merge is
//! pending.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{Head, Refs};
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::file_change::{IndexChange, WorkspaceChange};
use std::collections::{BTreeMap, BTreeSet};

/// Structured status of the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Checked-out branch, when HEAD is symbolic
    pub branch: Option<String>,
    /// HEAD commit when detached
    pub detached: Option<ObjectId>,
    /// Index vs. HEAD tree
    pub staged: BTreeMap<String, IndexChange>,
    /// Workspace vs. index
    pub unstaged: BTreeMap<String, WorkspaceChange>,
    /// Workspace paths absent from the index and not ignored
    pub untracked: BTreeSet<String>,
    /// Paths marked conflicted while a merge is pending
    pub conflicts: BTreeSet<String>,
    /// Whether MERGE_HEAD exists
    pub merging: bool,
}

impl StatusReport {
    /// Compute the report from a loaded index.
    pub fn compute(
        refs: &Refs,
        database: &Database,
        workspace: &Workspace,
        index: &Index,
    ) -> anyhow::Result<Self> {
        let head = refs.read_head()?;
        let (branch, detached) = match &head {
            Head::Symbolic { ref_name, .. } => (
                Some(
                    ref_name
                        .strip_prefix("refs/heads/")
                        .unwrap_or(ref_name)
                        .to_string(),
                ),
                None,
            ),
            Head::Direct(oid) => (None, Some(oid.clone())),
        };

        let head_tree = match head.oid() {
            Some(oid) => Some(database.read_tree(oid)?),
            None => None,
        };

        let merging = refs.read_merge_head()?.is_some();
        let conflicts: BTreeSet<String> = if merging {
            index.conflicts().clone()
        } else {
            BTreeSet::new()
        };

        let mut staged = Self::staged_changes(head_tree.as_ref(), index);
        let index_changes = index.changes(workspace)?;

        let mut unstaged = BTreeMap::new();
        for path in &index_changes.modified {
            unstaged.insert(path.clone(), WorkspaceChange::Modified);
        }
        for path in &index_changes.deleted {
            unstaged.insert(path.clone(), WorkspaceChange::Deleted);
        }

        // Conflicted paths get their own section only.
        for path in &conflicts {
            staged.remove(path);
            unstaged.remove(path);
        }

        Ok(StatusReport {
            branch,
            detached,
            staged,
            unstaged,
            untracked: index_changes.untracked,
            conflicts,
            merging,
        })
    }

    fn staged_changes(head_tree: Option<&Tree>, index: &Index) -> BTreeMap<String, IndexChange> {
        let mut staged = BTreeMap::new();
        static EMPTY: std::sync::OnceLock<Tree> = std::sync::OnceLock::new();
        let head_tree = head_tree.unwrap_or_else(|| EMPTY.get_or_init(Tree::default));

        for (path, entry) in index.entries() {
            match head_tree.get(path) {
                None => {
                    staged.insert(path.clone(), IndexChange::Added);
                }
                Some(record) if record.oid != entry.oid || record.mode != entry.mode => {
                    staged.insert(path.clone(), IndexChange::Modified);
                }
                Some(_) => {}
            }
        }

        for path in head_tree.paths() {
            if !index.is_tracked(path) {
                staged.insert(path.clone(), IndexChange::Deleted);
            }
        }

        staged
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.conflicts.is_empty()
    }

    /// The canonical long layout.
    pub fn format_long(&self) -> String {
        let mut out = String::new();

        match (&self.branch, &self.detached) {
            (Some(branch), _) => out.push_str(&format!("On branch {}\n", branch)),
            (None, Some(oid)) => {
                out.push_str(&format!("HEAD detached at {}\n", oid.to_short_oid()));
            }
            (None, None) => {}
        }

        if self.merging {
            out.push_str("You have unmerged paths.\n");
        }

        if !self.staged.is_empty() {
            out.push_str("\nChanges to be committed:\n");
            for (path, change) in &self.staged {
                out.push_str(&format!("\t{}:   {}\n", change.label(), path));
            }
        }

        if !self.conflicts.is_empty() {
            out.push_str("\nUnmerged paths:\n");
            for path in &self.conflicts {
                out.push_str(&format!("\tboth modified:   {}\n", path));
            }
        }

        if !self.unstaged.is_empty() {
            out.push_str("\nChanges not staged for commit:\n");
            for (path, change) in &self.unstaged {
                out.push_str(&format!("\t{}:   {}\n", change.label(), path));
            }
        }

        if !self.untracked.is_empty() {
            out.push_str("\nUntracked files:\n");
            for path in &self.untracked {
                out.push_str(&format!("\t{}\n", path));
            }
        }

        if self.is_clean() && self.untracked.is_empty() {
            out.push_str("nothing to commit, working tree clean\n");
        }

        out
    }

    /// The short `XY path` layout.
    pub fn format_porcelain(&self) -> String {
        let mut rows: BTreeMap<String, (char, char)> = BTreeMap::new();

        for (path, change) in &self.staged {
            rows.entry(path.clone()).or_insert((' ', ' ')).0 = change.short();
        }
        for (path, change) in &self.unstaged {
            rows.entry(path.clone()).or_insert((' ', ' ')).1 = change.short();
        }
        for path in &self.conflicts {
            rows.insert(path.clone(), ('U', 'U'));
        }
        for path in &self.untracked {
            rows.insert(path.clone(), ('?', '?'));
        }

        rows.into_iter()
            .map(|(path, (x, y))| format!("{}{} {}\n", x, y, path))
            .collect()
    }
}
