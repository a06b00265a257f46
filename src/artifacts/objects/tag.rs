//! Annotated tag record
//!
//! A lightweight tag is just a direct reference under `refs/tags/`. When the
//! tag carries a message, the ref file instead holds this serialized record
//! pointing at the tagged object.

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// The tagged object
    pub object: ObjectId,
    /// Kind of the tagged object ("commit" in practice)
    #[serde(rename = "type")]
    pub object_type: String,
    pub tagger: Author,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
}

impl TagRecord {
    pub fn new(
        object: ObjectId,
        tagger: Author,
        timestamp: DateTime<FixedOffset>,
        message: String,
    ) -> Self {
        TagRecord {
            object,
            object_type: "commit".to_string(),
            tagger,
            timestamp,
            message,
        }
    }
}
