//! Index entry representation
//!
//! Each entry describes one staged path: the blob that will enter the next
//! commit, the stat triple used for cheap change detection, and whether the
//! entry is freshly staged or carried over from the last commit.

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use is_executable::IsExecutable;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::Path;

/// One staged path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct IndexEntry {
    /// Blob id of the staged content
    pub oid: ObjectId,
    /// File size in bytes at staging time
    pub size: u64,
    /// Modification time (seconds since the Unix epoch)
    pub mtime: i64,
    /// Modification time, nanosecond part
    pub mtime_nsec: i64,
    /// File mode
    pub mode: FileMode,
    /// True until the entry is flushed into a commit
    pub staged: bool,
}

impl IndexEntry {
    pub fn from_stat(oid: ObjectId, stat: &FileStat) -> Self {
        IndexEntry {
            oid,
            size: stat.size,
            mtime: stat.mtime,
            mtime_nsec: stat.mtime_nsec,
            mode: stat.mode,
            staged: true,
        }
    }

    /// Cheap comparison against a fresh workspace stat.
    ///
    /// A full match lets change detection skip rehashing the file; any
    /// mismatch forces a rehash, so the fast path can never produce a false
    /// negative.
    pub fn stat_match(&self, stat: &FileStat) -> bool {
        self.size == stat.size
            && self.mode == stat.mode
            && self.mtime == stat.mtime
            && self.mtime_nsec == stat.mtime_nsec
    }
}

/// Stat triple of a workspace file, as used by the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub mode: FileMode,
}

impl TryFrom<(&Path, &Metadata)> for FileStat {
    type Error = anyhow::Error;

    fn try_from((path, metadata): (&Path, &Metadata)) -> anyhow::Result<Self> {
        #[cfg(unix)]
        let (mtime, mtime_nsec) = {
            use std::os::unix::fs::MetadataExt;
            (metadata.mtime(), metadata.mtime_nsec())
        };
        #[cfg(not(unix))]
        let (mtime, mtime_nsec) = {
            let modified = metadata.modified()?;
            let since_epoch = modified
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default();
            (
                since_epoch.as_secs() as i64,
                since_epoch.subsec_nanos() as i64,
            )
        };

        let mode = if path.is_executable() {
            FileMode::Executable
        } else {
            FileMode::Regular
        };

        Ok(FileStat {
            size: metadata.len(),
            mtime,
            mtime_nsec,
            mode,
        })
    }
}
