use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::errors::RepoError;
use std::io::Write;
use tracing::info;

impl Repository {
    /// Switch the workspace, index, and HEAD to another commit.
    ///
    /// Uncommitted changes that the switch would overwrite fail with
    /// `DirtyWorkspace` unless forced. A branch name leaves HEAD symbolic;
    /// anything else detaches it.
    pub async fn checkout(&self, target: &str, force: bool) -> anyhow::Result<()> {
        let target_oid = Revision::try_parse(target)?
            .resolve(self)?
            .ok_or_else(|| RepoError::InvalidArgument(format!("unknown revision: {}", target)))?;
        let target_commit = self.database().read_commit(&target_oid)?;
        let target_tree = self.database().read_tree(target_commit.tree_oid())?;

        let current_tree = match self.refs().head_oid()? {
            Some(oid) => Some(self.database().read_tree(&oid)?),
            None => None,
        };

        let index = self.index();
        let mut index = index.lock().await;
        let _file_lock = index.lock()?;
        index.read_from_disk()?;

        let migration =
            Migration::plan(&TreeDiff::between(current_tree.as_ref(), Some(&target_tree)));

        if !force {
            let changes = index.changes(self.workspace())?;
            let clobbered = migration.clobbered_paths(&changes);
            if !clobbered.is_empty() {
                return Err(RepoError::DirtyWorkspace.into());
            }
        }

        migration.apply(self.workspace(), self.database())?;
        index.replace_with_tree(&target_tree, self.workspace())?;
        index.write_to_disk()?;

        // Branch names keep HEAD symbolic; other revisions detach it.
        let branch_ref = format!("refs/heads/{}", target);
        if self.refs().resolve(&branch_ref)?.is_some() {
            self.refs().set_head_symbolic(&branch_ref)?;
            info!(branch = target, "checked out branch");
            writeln!(self.writer(), "Switched to branch '{}'", target)?;
        } else {
            self.refs().set_head_detached(&target_oid)?;
            info!(oid = %target_oid, "checked out detached HEAD");
            writeln!(
                self.writer(),
                "HEAD is now at {} {}",
                target_oid.to_short_oid(),
                target_commit.short_message()
            )?;
        }

        Ok(())
    }
}
