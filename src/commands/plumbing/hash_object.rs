use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use std::io::Write;

impl Repository {
    /// Hash a workspace file as a blob, optionally writing it to the store.
    pub async fn hash_object(&self, file: &str, write: bool) -> anyhow::Result<()> {
        let content = self.workspace().read_file(file)?;
        let blob = Blob::from_bytes(content);

        let oid = if write {
            self.database().store(&blob)?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{}", oid)?;
        Ok(())
    }
}
