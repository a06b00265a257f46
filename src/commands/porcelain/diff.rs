use crate::areas::repository::Repository;
use crate::artifacts::diff::binary::is_binary;
use crate::artifacts::diff::line_diff::{diff_lines, split_lines};
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::artifacts::diff::unified::UnifiedFormat;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    /// Show changes: working tree vs. index by default, index vs. HEAD tree
    /// with `staged`.
    pub async fn diff(&self, staged: bool) -> anyhow::Result<()> {
        let config = self.config()?;
        let format = UnifiedFormat {
            context: config.diff_context(),
            color: config.diff_color(),
        };

        let index = self.index();
        let mut index = index.lock().await;
        index.load()?;

        if staged {
            let head_tree = match self.refs().head_oid()? {
                Some(oid) => Some(self.database().read_tree(&oid)?),
                None => None,
            };

            let mut index_tree = Tree::default();
            for (path, entry) in index.entries() {
                index_tree.insert(
                    path.clone(),
                    crate::artifacts::objects::tree::TreeRecord::new(
                        entry.mode,
                        entry.oid.clone(),
                    ),
                );
            }

            let diff = TreeDiff::between(head_tree.as_ref(), Some(&index_tree));
            for path in diff.paths().cloned().collect::<Vec<_>>() {
                let old = head_tree.as_ref().and_then(|tree| tree.get(&path));
                let new = index_tree.get(&path);
                let old_bytes = self.blob_bytes(old.map(|record| &record.oid))?;
                let new_bytes = self.blob_bytes(new.map(|record| &record.oid))?;
                self.write_file_diff(&path, old_bytes, new_bytes, &format)?;
            }
        } else {
            let changes = index.changes(self.workspace())?;

            for path in changes.modified.iter().chain(changes.deleted.iter()) {
                let Some(entry) = index.entry(path) else {
                    continue;
                };
                let old_bytes = self.blob_bytes(Some(&entry.oid))?;
                let new_bytes = match self.workspace().stat_file(path)? {
                    Some(_) => Some(self.workspace().read_file(path)?),
                    None => None,
                };
                self.write_file_diff(path, old_bytes, new_bytes, &format)?;
            }
        }

        Ok(())
    }

    /// Patch for one commit against its first parent, used by `log --patch`.
    pub(crate) fn write_commit_patch(
        &self,
        commit_oid: &ObjectId,
        format: &UnifiedFormat,
    ) -> anyhow::Result<()> {
        let commit = self.database().read_commit(commit_oid)?;
        let new_tree = self.database().read_tree(commit.tree_oid())?;
        let old_tree = match commit.first_parent() {
            Some(parent) => {
                let parent_commit = self.database().read_commit(parent)?;
                Some(self.database().read_tree(parent_commit.tree_oid())?)
            }
            None => None,
        };

        let diff = TreeDiff::between(old_tree.as_ref(), Some(&new_tree));
        for path in diff.paths().cloned().collect::<Vec<_>>() {
            let old = old_tree.as_ref().and_then(|tree| tree.get(&path));
            let new = new_tree.get(&path);
            let old_bytes = self.blob_bytes(old.map(|record| &record.oid))?;
            let new_bytes = self.blob_bytes(new.map(|record| &record.oid))?;
            self.write_file_diff(&path, old_bytes, new_bytes, format)?;
        }

        Ok(())
    }

    fn blob_bytes(&self, oid: Option<&ObjectId>) -> anyhow::Result<Option<Bytes>> {
        match oid {
            Some(oid) => {
                let blob = self
                    .database()
                    .parse_object_as_blob(oid)?
                    .ok_or_else(|| anyhow::anyhow!("diff target {} is not a blob", oid))?;
                Ok(Some(blob.into_content()))
            }
            None => Ok(None),
        }
    }

    /// Render one file's diff, gating binary content out of the line engine.
    fn write_file_diff(
        &self,
        path: &str,
        old_bytes: Option<Bytes>,
        new_bytes: Option<Bytes>,
        format: &UnifiedFormat,
    ) -> anyhow::Result<()> {
        let old_label = match old_bytes {
            Some(_) => format!("a/{}", path),
            None => "/dev/null".to_string(),
        };
        let new_label = match new_bytes {
            Some(_) => format!("b/{}", path),
            None => "/dev/null".to_string(),
        };

        let binary = old_bytes.as_deref().map(is_binary).unwrap_or(false)
            || new_bytes.as_deref().map(is_binary).unwrap_or(false);
        if binary {
            if old_bytes != new_bytes {
                writeln!(
                    self.writer(),
                    "Binary files {} and {} differ",
                    old_label,
                    new_label
                )?;
            }
            return Ok(());
        }

        let old_text = String::from_utf8_lossy(old_bytes.as_deref().unwrap_or_default());
        let new_text = String::from_utf8_lossy(new_bytes.as_deref().unwrap_or_default());
        let chunks = diff_lines(&split_lines(&old_text), &split_lines(&new_text));

        let rendered = format.format(&old_label, &new_label, &chunks);
        write!(self.writer(), "{}", rendered)?;

        Ok(())
    }
}
