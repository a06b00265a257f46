use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::errors::RepoError;
use std::io::Write;

/// How much state `reset` moves along with HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Move HEAD only
    Soft,
    /// Move HEAD and the index
    #[default]
    Mixed,
    /// Move HEAD, the index, and the workspace
    Hard,
}

impl Repository {
    /// Move the current branch (or detached HEAD) to another commit.
    ///
    /// `--hard` refuses to discard uncommitted changes unless forced.
    pub async fn reset(
        &self,
        revision: &str,
        mode: ResetMode,
        force: bool,
    ) -> anyhow::Result<()> {
        let target_oid = Revision::try_parse(revision)?
            .resolve(self)?
            .ok_or_else(|| {
                RepoError::InvalidArgument(format!("unknown revision: {}", revision))
            })?;
        let target_commit = self.database().read_commit(&target_oid)?;
        let target_tree = self.database().read_tree(target_commit.tree_oid())?;

        if mode == ResetMode::Soft {
            self.refs().update_head(&target_oid)?;
            writeln!(self.writer(), "HEAD is now at {}", target_oid.to_short_oid())?;
            return Ok(());
        }

        let index = self.index();
        let mut index = index.lock().await;
        let _file_lock = index.lock()?;
        index.read_from_disk()?;

        if mode == ResetMode::Hard {
            let current_tree = match self.refs().head_oid()? {
                Some(oid) => Some(self.database().read_tree(&oid)?),
                None => None,
            };
            let migration = Migration::plan(&TreeDiff::between(
                current_tree.as_ref(),
                Some(&target_tree),
            ));

            if !force {
                let changes = index.changes(self.workspace())?;
                if !migration.clobbered_paths(&changes).is_empty() {
                    return Err(RepoError::DirtyWorkspace.into());
                }
            }

            migration.apply(self.workspace(), self.database())?;
        }

        index.replace_with_tree(&target_tree, self.workspace())?;
        index.write_to_disk()?;

        self.refs().update_head(&target_oid)?;
        self.refs().clear_merge_head()?;

        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            target_commit.short_message()
        )?;

        Ok(())
    }
}
