//! Three-way merge synthesis
//!
//! Given the base snapshot and both endpoint snapshots, each path is
//! classified by which sides changed it since the base:
//!
//! - changed on one side only → take that side
//! - changed identically on both → take either
//! - changed incompatibly on both → conflict
//!
//! Conflicts resolve per the caller's strategy: keep ours, take theirs, or
//! synthesize a blob with textual conflict markers for the user to edit.

use crate::areas::database::Database;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeRecord};
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::debug;

/// How to resolve paths both sides changed incompatibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Embed conflict markers and report the paths (default)
    #[default]
    Mark,
    /// Keep the target side
    Ours,
    /// Take the source side
    Theirs,
}

/// Result of synthesizing the merged snapshot.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// The merged snapshot (not yet persisted)
    pub tree: Tree,
    /// Paths left with conflict markers, sorted
    pub conflicts: Vec<String>,
    /// Marker-bearing file contents for the workspace, keyed by path
    pub conflict_files: BTreeMap<String, Bytes>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Three-way merger over flat snapshots.
pub struct ThreeWayMerge<'r> {
    database: &'r Database,
    /// Label of the incoming side in conflict markers (branch name)
    source_name: String,
    strategy: MergeStrategy,
}

impl<'r> ThreeWayMerge<'r> {
    pub fn new(database: &'r Database, source_name: String, strategy: MergeStrategy) -> Self {
        ThreeWayMerge {
            database,
            source_name,
            strategy,
        }
    }

    /// Merge `theirs` into `ours` relative to `base`.
    ///
    /// `base` is `None` for orphan merges (unrelated histories), which makes
    /// every path on either side an addition.
    pub fn merge(
        &self,
        base: Option<&Tree>,
        ours: &Tree,
        theirs: &Tree,
    ) -> anyhow::Result<MergeOutcome> {
        let our_changes = TreeDiff::between(base, Some(ours));
        let their_changes = TreeDiff::between(base, Some(theirs));

        // Start from the target side; only paths the source changed need work.
        let mut outcome = MergeOutcome {
            tree: ours.clone(),
            ..Default::default()
        };

        for path in their_changes.paths().cloned().collect::<Vec<_>>() {
            let their_record = theirs.get(&path);
            let changed_in_ours = our_changes.status_char(&path).is_some();

            if !changed_in_ours {
                // Source-only change: take source.
                match their_record {
                    Some(record) => outcome.tree.insert(path.clone(), record.clone()),
                    None => {
                        outcome.tree.remove(&path);
                    }
                }
                continue;
            }

            let our_record = ours.get(&path);
            if our_record == their_record {
                // Identical change on both sides; either side works.
                continue;
            }

            debug!(path = %path, "merge conflict");
            match self.strategy {
                MergeStrategy::Ours => {}
                MergeStrategy::Theirs => match their_record {
                    Some(record) => outcome.tree.insert(path.clone(), record.clone()),
                    None => {
                        outcome.tree.remove(&path);
                    }
                },
                MergeStrategy::Mark => {
                    let content = self.conflict_content(
                        our_record.map(|r| &r.oid),
                        their_record.map(|r| &r.oid),
                    )?;
                    let blob =
                        crate::artifacts::objects::blob::Blob::from_bytes(content.clone());
                    let oid = self.database.store(&blob)?;

                    let mode = our_record
                        .or(their_record)
                        .map(|record| record.mode)
                        .unwrap_or_default();
                    outcome.tree.insert(path.clone(), TreeRecord::new(mode, oid));
                    outcome.conflict_files.insert(path.clone(), content);
                    outcome.conflicts.push(path);
                }
            }
        }

        outcome.conflicts.sort();
        Ok(outcome)
    }

    /// Build the marker block: target content, separator, source content.
    fn conflict_content(
        &self,
        ours: Option<&ObjectId>,
        theirs: Option<&ObjectId>,
    ) -> anyhow::Result<Bytes> {
        let mut content = Vec::new();

        content.extend_from_slice(b"<<<<<<< HEAD\n");
        content.extend_from_slice(&self.blob_content(ours)?);
        content.extend_from_slice(b"=======\n");
        content.extend_from_slice(&self.blob_content(theirs)?);
        content.extend_from_slice(format!(">>>>>>> {}\n", self.source_name).as_bytes());

        Ok(Bytes::from(content))
    }

    /// Blob bytes with a guaranteed trailing newline (deleted side is empty).
    fn blob_content(&self, oid: Option<&ObjectId>) -> anyhow::Result<Vec<u8>> {
        let Some(oid) = oid else {
            return Ok(Vec::new());
        };

        let blob = self
            .database
            .parse_object_as_blob(oid)?
            .ok_or_else(|| anyhow::anyhow!("conflict side {} is not a blob", oid))?;
        let mut content = blob.into_content().to_vec();

        if !content.is_empty() && !content.ends_with(b"\n") {
            content.push(b'\n');
        }

        Ok(content)
    }
}
