//! Commit history traversal
//!
//! History is walked along first parents only, newest to oldest, bounded by
//! a depth limit. Full-graph traversal (all parents) belongs to the merge
//! engine's base finder.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;

/// Default bound on history walks.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// First-parent history walker.
pub struct History<'r> {
    database: &'r Database,
}

impl<'r> History<'r> {
    pub fn new(database: &'r Database) -> Self {
        History { database }
    }

    /// Commits reachable from `start` along first parents, newest first,
    /// bounded by `max_depth` (default 100) or the root.
    pub fn walk(
        &self,
        start: &ObjectId,
        max_depth: Option<usize>,
    ) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let max_depth = max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        let mut commits = Vec::new();
        let mut cursor = Some(start.clone());

        while let Some(oid) = cursor {
            if commits.len() >= max_depth {
                break;
            }

            let commit = self.database.read_commit(&oid)?;
            cursor = commit.first_parent().cloned();
            commits.push((oid, commit));
        }

        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Author;
    use crate::artifacts::objects::object::Object;
    use crate::artifacts::objects::tree::Tree;
    use chrono::TimeZone;

    fn commit_chain(database: &Database, messages: &[&str]) -> Vec<ObjectId> {
        let tree = Tree::default();
        let tree_oid = database.store(&tree).unwrap();
        let author = Author::new("Ada".into(), "ada@example.com".into());
        let base_time = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap();

        let mut oids: Vec<ObjectId> = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            let parents = oids.last().cloned().into_iter().collect();
            let commit = Commit::new(
                tree_oid.clone(),
                parents,
                author.clone(),
                base_time + chrono::Duration::hours(index as i64),
                message.to_string(),
            );
            oids.push(database.store(&commit).unwrap());
        }
        oids
    }

    #[test]
    fn walks_newest_to_oldest_until_the_root() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let oids = commit_chain(&database, &["first", "second", "third"]);

        let history = History::new(&database)
            .walk(oids.last().unwrap(), None)
            .unwrap();

        let messages: Vec<&str> = history
            .iter()
            .map(|(_, commit)| commit.message())
            .collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
    }

    #[test]
    fn depth_bound_truncates_the_walk() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let oids = commit_chain(&database, &["a", "b", "c", "d"]);

        let history = History::new(&database)
            .walk(oids.last().unwrap(), Some(2))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].1.message(), "d");
    }
}
