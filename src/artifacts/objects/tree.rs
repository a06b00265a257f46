//! Tree object
//!
//! A tree captures the layout of one snapshot: a flat mapping from
//! workspace-relative path to `{file mode, blob id}`. Paths use forward
//! slashes on every host and contain no `.` or `..` segments.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<canonical JSON>`
//!
//! The JSON content keeps entries in a `BTreeMap`, so keys serialize sorted
//! lexicographically and the tree's hash is independent of insertion order.

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, pack};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;

/// One tree slot: which blob lives at a path, and with which mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct TreeRecord {
    pub mode: FileMode,
    pub oid: ObjectId,
}

/// Snapshot of the workspace as a flat path → record map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: BTreeMap<String, TreeRecord>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, TreeRecord>) -> Self {
        Tree { entries }
    }

    pub fn insert(&mut self, path: String, record: TreeRecord) {
        self.entries.insert(path, record);
    }

    pub fn get(&self, path: &str) -> Option<&TreeRecord> {
        self.entries.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<TreeRecord> {
        self.entries.remove(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeRecord)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> BTreeMap<String, TreeRecord> {
        self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content = serde_json::to_vec(self)?;
        Ok(pack(self.object_type(), &content))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(serde_json::from_slice(&content)?)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(path, record)| {
                format!(
                    "{} blob {}\t{}",
                    record.mode.as_str(),
                    record.oid.as_ref(),
                    path
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
