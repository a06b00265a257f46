//! Content-addressed object store
//!
//! The store keeps every object (blob, tree, commit) under the hash of its
//! serialized bytes. Objects are write-once: a `put` of bytes that already
//! exist is a no-op, and nothing ever mutates or deletes a stored object.
//!
//! ## Storage format
//!
//! - Path: `.dotgit/objects/<64-hex-hash>` (flat layout)
//! - Content: the raw envelope bytes, exactly as hashed
//!
//! Because the file name is the hash of the file's bytes, corruption is
//! detectable on every read.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepoError;
use anyhow::Context;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::{BufRead, Cursor, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Object database
///
/// Provides the keyless "put bytes, get hash" interface plus typed parsing
/// on top of it. All reads are side-effect free.
#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.dotgit/objects`)
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store serialized object bytes under their hash.
    ///
    /// Idempotent: concurrent writers of the same bytes race toward the same
    /// file name via independent temp files, and the last rename wins with
    /// identical content. The write is durable (file and directory synced)
    /// before this returns.
    pub fn put(&self, bytes: Bytes) -> anyhow::Result<ObjectId> {
        let oid = ObjectId::try_parse(format!("{:x}", Sha256::digest(&bytes)))?;
        let object_path = self.path.join(oid.to_path());

        if object_path.exists() {
            trace!(oid = %oid, "object already present");
            return Ok(oid);
        }

        std::fs::create_dir_all(&self.path).with_context(|| {
            format!("Unable to create object directory {}", self.path.display())
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.path)
            .context("Unable to create temporary object file")?;
        temp.write_all(&bytes)
            .context("Unable to write object content")?;
        temp.as_file()
            .sync_all()
            .context("Unable to sync object content")?;
        temp.persist(&object_path)
            .with_context(|| format!("Unable to persist object {}", object_path.display()))?;

        // Sync the directory entry so the rename survives a crash.
        std::fs::File::open(&self.path)
            .and_then(|dir| dir.sync_all())
            .context("Unable to sync objects directory")?;

        debug!(oid = %oid, len = bytes.len(), "stored object");
        Ok(oid)
    }

    /// Load raw object bytes, verifying them against the object's name.
    pub fn get(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::ObjectMissing(object_id.to_string()).into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(RepoError::IoError(format!(
                    "{}: {}",
                    object_path.display(),
                    e
                ))));
            }
        };

        let digest = format!("{:x}", Sha256::digest(&content));
        if digest != object_id.as_ref() {
            return Err(RepoError::CorruptObject(object_id.to_string()).into());
        }

        Ok(Bytes::from(content))
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Serialize and store an object, returning its id.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.put(object.serialize()?)
    }

    /// Parse an object into the appropriate type.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, reader) = self.open_object(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(reader)?))),
        }
    }

    /// Parse an object as a blob, if it is one.
    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (object_type, reader) = self.open_object(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a tree, if it is one.
    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let (object_type, reader) = self.open_object(object_id)?;

        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a commit, if it is one.
    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (object_type, reader) = self.open_object(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// Read a commit, failing with `CommitMissing` when the id does not name
    /// a stored commit.
    pub fn read_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        match self.parse_object_as_commit(object_id) {
            Ok(Some(commit)) => Ok(commit),
            Ok(None) => Err(RepoError::CommitMissing(object_id.to_string()).into()),
            Err(e) => match e.downcast_ref::<RepoError>() {
                Some(RepoError::ObjectMissing(_)) => {
                    Err(RepoError::CommitMissing(object_id.to_string()).into())
                }
                _ => Err(e),
            },
        }
    }

    /// Minimal commit view used by graph traversals.
    pub fn read_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self.read_commit(object_id)?;
        Ok(SlimCommit {
            oid: object_id.clone(),
            parents: commit.parents().to_vec(),
            timestamp: commit.timestamp(),
        })
    }

    /// Load the tree of a commit (or a tree object directly).
    pub fn read_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            ObjectBox::Commit(commit) => self.read_tree(commit.tree_oid()),
            ObjectBox::Blob(_) => Err(anyhow::anyhow!("Object {} is not a tree", object_id)),
        }
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.open_object(object_id)?;
        Ok(object_type)
    }

    /// Find all objects whose id starts with the given hex prefix.
    ///
    /// Used to resolve abbreviated ids; more than one match means the prefix
    /// is ambiguous.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if !self.path.exists() {
            return Ok(matches);
        }

        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.len() == OBJECT_ID_LENGTH && file_name.starts_with(prefix) {
                matches.push(ObjectId::try_parse(file_name.to_string())?);
            }
        }

        Ok(matches)
    }

    fn open_object(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let content = self.get(object_id)?;
        let mut reader = Cursor::new(content);
        let (object_type, _) = ObjectType::parse_header(&mut reader)?;

        Ok((object_type, reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    #[test]
    fn put_is_idempotent_and_round_trips() {
        let (_dir, database) = database();
        let blob = Blob::from_bytes(&b"hello\n"[..]);
        let bytes = blob.serialize().unwrap();

        let first = database.put(bytes.clone()).unwrap();
        let second = database.put(bytes.clone()).unwrap();

        assert_eq!(first, second);
        assert_eq!(database.get(&first).unwrap(), bytes);
        assert!(database.exists(&first));
    }

    #[test]
    fn missing_object_is_reported_as_such() {
        let (_dir, database) = database();
        let absent = ObjectId::try_parse("0".repeat(OBJECT_ID_LENGTH)).unwrap();

        let err = database.get(&absent).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepoError>(),
            Some(RepoError::ObjectMissing(_))
        ));
    }

    #[test]
    fn tampered_object_is_detected_on_read() {
        let (_dir, database) = database();
        let oid = database.store(&Blob::from_bytes(&b"payload"[..])).unwrap();

        let object_path = database.objects_path().join(oid.to_path());
        std::fs::write(&object_path, b"tampered").unwrap();

        let err = database.get(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepoError>(),
            Some(RepoError::CorruptObject(_))
        ));
    }

    #[test]
    fn prefix_search_finds_unique_match() {
        let (_dir, database) = database();
        let oid = database.store(&Blob::from_bytes(&b"prefix me"[..])).unwrap();

        let matches = database.find_objects_by_prefix(&oid.as_ref()[..8]).unwrap();
        assert_eq!(matches, vec![oid]);
    }
}
