//! Snapshot-level comparison
//!
//! Trees are flat path → record maps, so comparing two snapshots is a
//! sorted-map walk classifying each path as added, deleted, or modified
//! (present in both with a different blob or mode).

use crate::artifacts::objects::tree::{Tree, TreeRecord};
use std::collections::BTreeMap;

/// One modified path with both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedEntry {
    pub old: TreeRecord,
    pub new: TreeRecord,
}

/// Changes between two snapshots, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: BTreeMap<String, TreeRecord>,
    pub deleted: BTreeMap<String, TreeRecord>,
    pub modified: BTreeMap<String, ModifiedEntry>,
}

impl TreeDiff {
    /// Compare two snapshots; `None` stands for the empty tree.
    pub fn between(old: Option<&Tree>, new: Option<&Tree>) -> Self {
        static EMPTY: std::sync::OnceLock<Tree> = std::sync::OnceLock::new();
        let empty = EMPTY.get_or_init(Tree::default);

        let old = old.unwrap_or(empty);
        let new = new.unwrap_or(empty);
        let mut diff = TreeDiff::default();

        for (path, old_record) in old.entries() {
            match new.get(path) {
                None => {
                    diff.deleted.insert(path.clone(), old_record.clone());
                }
                Some(new_record) if new_record != old_record => {
                    diff.modified.insert(
                        path.clone(),
                        ModifiedEntry {
                            old: old_record.clone(),
                            new: new_record.clone(),
                        },
                    );
                }
                Some(_) => {}
            }
        }

        for (path, new_record) in new.entries() {
            if old.get(path).is_none() {
                diff.added.insert(path.clone(), new_record.clone());
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    /// Every path touched by this diff, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.deleted
            .keys()
            .chain(self.modified.keys())
            .chain(self.added.keys())
    }

    /// Status letter for name-status listings.
    pub fn status_char(&self, path: &str) -> Option<char> {
        if self.added.contains_key(path) {
            Some('A')
        } else if self.deleted.contains_key(path) {
            Some('D')
        } else if self.modified.contains_key(path) {
            Some('M')
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;
    use sha2::{Digest, Sha256};

    fn oid_of(data: &str) -> ObjectId {
        ObjectId::try_parse(format!("{:x}", Sha256::digest(data))).unwrap()
    }

    fn tree(entries: &[(&str, &str)]) -> Tree {
        let mut tree = Tree::default();
        for (path, content) in entries {
            tree.insert(
                path.to_string(),
                TreeRecord::new(FileMode::Regular, oid_of(content)),
            );
        }
        tree
    }

    #[test]
    fn identical_trees_diff_empty() {
        let snapshot = tree(&[("a.txt", "a"), ("b.txt", "b")]);
        assert!(TreeDiff::between(Some(&snapshot), Some(&snapshot)).is_empty());
    }

    #[test]
    fn classifies_added_deleted_modified() {
        let old = tree(&[("kept.txt", "same"), ("gone.txt", "bye"), ("edit.txt", "v1")]);
        let new = tree(&[("kept.txt", "same"), ("new.txt", "hi"), ("edit.txt", "v2")]);

        let diff = TreeDiff::between(Some(&old), Some(&new));
        assert_eq!(diff.added.keys().collect::<Vec<_>>(), vec!["new.txt"]);
        assert_eq!(diff.deleted.keys().collect::<Vec<_>>(), vec!["gone.txt"]);
        assert_eq!(diff.modified.keys().collect::<Vec<_>>(), vec!["edit.txt"]);
    }

    #[test]
    fn mode_change_alone_is_a_modification() {
        let old = tree(&[("run.sh", "script")]);
        let mut new = old.clone();
        new.insert(
            "run.sh".to_string(),
            TreeRecord::new(FileMode::Executable, oid_of("script")),
        );

        let diff = TreeDiff::between(Some(&old), Some(&new));
        assert!(diff.modified.contains_key("run.sh"));
    }

    #[test]
    fn empty_side_means_everything_added_or_deleted() {
        let snapshot = tree(&[("a.txt", "a")]);

        let against_nothing = TreeDiff::between(None, Some(&snapshot));
        assert_eq!(against_nothing.added.len(), 1);

        let to_nothing = TreeDiff::between(Some(&snapshot), None);
        assert_eq!(to_nothing.deleted.len(), 1);
    }
}
