use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::artifacts::merge::base_finder::MergeBaseFinder;
use crate::artifacts::merge::three_way::{MergeStrategy, ThreeWayMerge};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepoError;
use std::io::Write;
use tracing::{debug, info};

impl Repository {
    /// Merge `source` into the current HEAD.
    ///
    /// Fast-forwards when HEAD is the merge base; otherwise runs a
    /// three-way merge. Unresolved conflicts persist `MERGE_HEAD`, leave
    /// marker blocks in the workspace, and fail with `MergeConflict`.
    pub async fn merge(
        &self,
        source: &str,
        strategy: MergeStrategy,
        message: Option<String>,
    ) -> anyhow::Result<()> {
        let head_oid = self.refs().head_oid()?.ok_or_else(|| {
            RepoError::InvalidArgument("cannot merge before the first commit".into())
        })?;
        let source_oid = Revision::try_parse(source)?
            .resolve(self)?
            .ok_or_else(|| RepoError::InvalidArgument(format!("unknown revision: {}", source)))?;

        if source_oid == head_oid {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let database = self.database();
        let base = {
            let finder = MergeBaseFinder::new(|oid| database.read_slim_commit(oid));
            finder.find(&source_oid, &head_oid)?
        };
        debug!(base = ?base.as_ref().map(|oid| oid.to_short_oid()), "merge base");

        if base.as_ref() == Some(&source_oid) {
            // The source is already part of this history.
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let head_tree = database.read_tree(&head_oid)?;
        let source_tree = database.read_tree(&source_oid)?;

        let index = self.index();
        let mut index = index.lock().await;
        let _file_lock = index.lock()?;
        index.read_from_disk()?;

        if base.as_ref() == Some(&head_oid) {
            // Fast-forward: the branch advances without a merge commit.
            self.switch_tree(&index, &head_tree, &source_tree)?;
            index.replace_with_tree(&source_tree, self.workspace())?;
            index.write_to_disk()?;
            self.refs().update_head(&source_oid)?;

            info!(oid = %source_oid, "fast-forward merge");
            writeln!(
                self.writer(),
                "Updating to {}\nFast-forward",
                source_oid.to_short_oid()
            )?;
            return Ok(());
        }

        let base_tree = match &base {
            Some(oid) => Some(database.read_tree(oid)?),
            None => None,
        };

        let merger = ThreeWayMerge::new(database, source.to_string(), strategy);
        let outcome = merger.merge(base_tree.as_ref(), &head_tree, &source_tree)?;

        // Materialize the merged snapshot (conflict markers included).
        self.switch_tree(&index, &head_tree, &outcome.tree)?;
        index.replace_with_tree(&outcome.tree, self.workspace())?;

        if outcome.has_conflicts() {
            self.refs().write_merge_head(&source_oid)?;
            for path in &outcome.conflicts {
                index.mark_conflict(path.clone());
            }
            index.write_to_disk()?;

            writeln!(
                self.writer(),
                "Automatic merge failed; fix conflicts and then commit the result."
            )?;
            return Err(RepoError::MergeConflict(outcome.conflicts).into());
        }

        index.write_to_disk()?;

        let tree_oid = database.store(&outcome.tree)?;
        let message = message.unwrap_or_else(|| format!("Merge branch '{}'", source));
        let commit = Commit::new(
            tree_oid,
            vec![head_oid, source_oid],
            self.resolve_author()?,
            self.author_timestamp(),
            message,
        );
        let commit_oid = database.store(&commit)?;

        self.refs().update_head(&commit_oid)?;
        self.refs().clear_merge_head()?;

        info!(oid = %commit_oid, "merge commit");
        writeln!(
            self.writer(),
            "Merge made: {} {}",
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }

    /// Move the workspace from one snapshot to another, refusing to clobber
    /// local changes.
    fn switch_tree(
        &self,
        index: &crate::areas::index::Index,
        from: &Tree,
        to: &Tree,
    ) -> anyhow::Result<()> {
        let migration = Migration::plan(&TreeDiff::between(Some(from), Some(to)));

        let changes = index.changes(self.workspace())?;
        let clobbered = migration.clobbered_paths(&changes);
        if !clobbered.is_empty() {
            return Err(RepoError::DirtyWorkspace.into());
        }

        migration.apply(self.workspace(), self.database())
    }
}
