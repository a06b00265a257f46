use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::io::Write;
use tracing::info;

impl Repository {
    /// Flush the index into a tree, record a commit, and advance whatever
    /// HEAD points at.
    ///
    /// While `MERGE_HEAD` exists the commit records two parents and clears
    /// the marker. On a detached HEAD the new commit is written to `HEAD`
    /// itself; no branch moves.
    pub async fn commit(&self, message: &str) -> anyhow::Result<ObjectId> {
        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(RepoError::InvalidArgument("empty commit message".into()).into());
        }

        let author = self.resolve_author()?;
        let index = self.index();
        let mut index = index.lock().await;

        // One lock spans the whole flush so a concurrent `add` cannot slip
        // between reading entries and rewriting the document.
        let _file_lock = index.lock()?;
        index.read_from_disk()?;

        let head = self.refs().read_head()?;
        let head_oid = head.oid().cloned();
        let merge_head = self.refs().read_merge_head()?;

        if !index.conflicts().is_empty() {
            return Err(RepoError::InvalidArgument(
                "unresolved merge conflicts; stage the fixed files first".into(),
            )
            .into());
        }

        let tree_oid = index.write_tree(self.database())?;

        // Object writes above precede every reference write below.
        let parents: Vec<ObjectId> = match (&head_oid, &merge_head) {
            (Some(head), Some(merge)) => vec![head.clone(), merge.clone()],
            (Some(head), None) => {
                let head_commit = self.database().read_commit(head)?;
                if head_commit.tree_oid() == &tree_oid {
                    return Err(
                        RepoError::InvalidArgument("nothing to commit".into()).into()
                    );
                }
                vec![head.clone()]
            }
            (None, _) => {
                if index.is_empty() {
                    return Err(
                        RepoError::InvalidArgument("nothing to commit".into()).into()
                    );
                }
                Vec::new()
            }
        };

        let commit = Commit::new(
            tree_oid,
            parents,
            author,
            self.author_timestamp(),
            message.clone(),
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_head(&commit_oid)?;
        self.refs().clear_merge_head()?;

        index.flush_staged_flags();
        index.write_to_disk()?;

        let location = match &head {
            Head::Symbolic { ref_name, .. } => ref_name
                .strip_prefix("refs/heads/")
                .unwrap_or(ref_name)
                .to_string(),
            Head::Direct(_) => "detached HEAD".to_string(),
        };
        let root_marker = if head_oid.is_none() { "(root-commit) " } else { "" };

        info!(oid = %commit_oid, "created commit");
        writeln!(
            self.writer(),
            "[{} {}{}] {}",
            location,
            root_marker,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }
}
