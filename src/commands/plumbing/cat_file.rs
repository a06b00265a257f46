use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::{MIN_ABBREV_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    /// Print an object's content. Blobs are written byte-exact; trees and
    /// commits render in their display form.
    pub async fn cat_file(&self, id: &str) -> anyhow::Result<()> {
        let oid = self.resolve_object_id(id)?;

        match self.database().parse_object(&oid)? {
            ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
            ObjectBox::Tree(tree) => writeln!(self.writer(), "{}", tree.display())?,
            ObjectBox::Commit(commit) => writeln!(self.writer(), "{}", commit.display())?,
        }

        Ok(())
    }

    fn resolve_object_id(&self, id: &str) -> anyhow::Result<ObjectId> {
        if id.len() == OBJECT_ID_LENGTH {
            return ObjectId::try_parse(id.to_string());
        }

        if id.len() < MIN_ABBREV_LENGTH || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RepoError::InvalidArgument(format!("not an object id: {}", id)).into());
        }

        let mut matches = self.database().find_objects_by_prefix(id)?;
        match matches.len() {
            0 => Err(RepoError::ObjectMissing(id.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(RepoError::InvalidArgument(format!(
                "ambiguous object id prefix: {}",
                id
            ))
            .into()),
        }
    }
}
