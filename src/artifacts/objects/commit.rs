//! Commit object
//!
//! Commits are the nodes of history: a tree id plus lineage (zero, one, or
//! more parents), an author, an ISO-8601 timestamp, and a message.
//!
//! ## Format
//!
//! On disk: `commit <size>\0<canonical JSON>`
//!
//! The JSON fields appear in a fixed declaration order and the timestamp is
//! RFC 3339, so the same logical commit always hashes identically.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, pack};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Commit author identity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author { name, email }
    }

    /// "Name <email@example.com>" form used by log output.
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Minimal commit view for history-graph algorithms.
///
/// Owns its data so graph walks can hold many of these without borrowing
/// from the database.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object id
    pub oid: ObjectId,
    /// Parent object ids
    pub parents: Vec<ObjectId>,
    /// Commit timestamp (used to order graph traversal)
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Tree id representing the snapshot
    tree: ObjectId,
    /// Parents (empty for the root commit, two or more for merges)
    parents: Vec<ObjectId>,
    author: Author,
    timestamp: DateTime<FixedOffset>,
    message: String,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: Author,
        timestamp: DateTime<FixedOffset>,
        message: String,
    ) -> Self {
        Commit {
            tree,
            parents,
            author,
            timestamp,
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the one history walks follow.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message, for one-line displays.
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn to_slim(&self) -> anyhow::Result<SlimCommit> {
        Ok(SlimCommit {
            oid: self.object_id()?,
            parents: self.parents.clone(),
            timestamp: self.timestamp,
        })
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content = serde_json::to_vec(self)?;
        Ok(pack(self.object_type(), &content))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(serde_json::from_slice(&content)?)
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree.as_ref())];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display_name()));
        lines.push(format!("date {}", self.timestamp.to_rfc3339()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sha2::{Digest, Sha256};
    use std::io::Cursor;

    fn oid_of(data: &str) -> ObjectId {
        ObjectId::try_parse(format!("{:x}", Sha256::digest(data))).unwrap()
    }

    fn fixed_timestamp() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn round_trips_all_fields() {
        let commit = Commit::new(
            oid_of("tree"),
            vec![oid_of("p1"), oid_of("p2")],
            Author::new("Ada".into(), "ada@example.com".into()),
            fixed_timestamp(),
            "merge both lines\n\nbody".into(),
        );

        let serialized = Packable::serialize(&commit).unwrap();
        let mut reader = Cursor::new(serialized);
        let (object_type, _) = ObjectType::parse_header(&mut reader).unwrap();
        assert_eq!(object_type, ObjectType::Commit);

        let restored = <Commit as Unpackable>::deserialize(reader).unwrap();
        assert_eq!(restored, commit);
        assert_eq!(restored.short_message(), "merge both lines");
    }

    #[test]
    fn root_commit_has_no_parents() {
        let commit = Commit::new(
            oid_of("tree"),
            vec![],
            Author::new("Ada".into(), "ada@example.com".into()),
            fixed_timestamp(),
            "first".into(),
        );

        assert!(commit.is_root());
        assert!(commit.first_parent().is_none());
    }
}
