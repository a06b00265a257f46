//! Object identifier (SHA-256 hash)
//!
//! Object ids are 64-character hexadecimal strings identifying every object
//! in the store (blobs, trees, commits).
//!
//! ## Format
//!
//! - Full: 64 hex characters
//! - Short: first 7 characters, for display
//!
//! ## Storage
//!
//! Objects live at `objects/<full-hex-id>`; the id doubles as the file name,
//! which is what makes corruption detectable on read.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content hash identifying one object.
///
/// A validated 64-character hexadecimal string. Serializes as a plain JSON
/// string inside trees, commits, and the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if the length or characters are invalid
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object id length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            return Err(anyhow::anyhow!("Invalid object id characters: {}", id));
        }
        Ok(Self(id))
    }

    /// Path of this object relative to the objects directory.
    ///
    /// The store is flat: the full hex id is the file name.
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Abbreviated form for display (first 7 characters).
    pub fn to_short_oid(&self) -> String {
        self.0[..7].to_string()
    }
}

impl TryFrom<String> for ObjectId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        Self::try_parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    #[test]
    fn parses_a_sha256_digest() {
        let digest = format!("{:x}", Sha256::digest(b"content"));
        let oid = ObjectId::try_parse(digest.clone()).unwrap();
        assert_eq!(oid.as_ref(), digest);
        assert_eq!(oid.to_short_oid().len(), 7);
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(ObjectId::try_parse("abc123".to_string()).is_err());
        assert!(ObjectId::try_parse("g".repeat(64)).is_err());
        assert!(ObjectId::try_parse("A".repeat(64)).is_err());
    }
}
