//! Core object traits
//!
//! Every stored object implements:
//! - `Packable`: serialization to the on-disk envelope
//! - `Unpackable`: deserialization from the envelope content
//! - `Object`: common operations (id computation, display)
//!
//! ## Object format
//!
//! All objects are stored as:
//! ```text
//! <type> <size>\0<content>
//! ```
//! Blob content is the raw file bytes; tree and commit content is canonical
//! JSON (sorted keys, compact whitespace) so rewriting the same logical
//! object always yields the same bytes and hash.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::BufRead;
use std::path::PathBuf;

/// Trait for serializing objects to the on-disk envelope
pub trait Packable {
    /// Serialize the object to bytes (including header)
    fn serialize(&self) -> Result<Bytes>;
}

/// Trait for deserializing objects from envelope content
pub trait Unpackable {
    /// Deserialize the object from a reader (header already consumed)
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Core stored-object trait
///
/// Implemented by all object kinds (Blob, Tree, Commit).
pub trait Object: Packable {
    /// Get the object's type
    fn object_type(&self) -> ObjectType;

    /// Get a human-readable representation
    fn display(&self) -> String;

    /// Compute the object id (SHA-256 over the serialized envelope)
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let digest = Sha256::digest(&content);
        ObjectId::try_parse(format!("{digest:x}"))
    }

    /// Path where this object would be stored, relative to the objects dir
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Wrap content bytes in the `<type> <size>\0` envelope.
pub(crate) fn pack(object_type: ObjectType, content: &[u8]) -> Bytes {
    let mut bytes = Vec::with_capacity(content.len() + 16);
    bytes.extend_from_slice(format!("{} {}\0", object_type.as_str(), content.len()).as_bytes());
    bytes.extend_from_slice(content);
    Bytes::from(bytes)
}

/// Type-erased object container
///
/// Used when the specific object type isn't known at compile time.
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}
