//! Engine error taxonomy
//!
//! Internal helpers propagate `anyhow::Error` chains; the kinds below are
//! attached at the point of failure so entry points (and the CLI) can
//! recognize them with `downcast_ref` and map them to stable exit codes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not a dotgit repository (no control directory found)")]
    RepositoryNotFound,

    #[error("repository already initialized at {}", .0.display())]
    RepositoryExists(PathBuf),

    #[error("HEAD is malformed: {0}")]
    InvalidHead(String),

    #[error("object {0} is missing from the object store")]
    ObjectMissing(String),

    #[error("object {0} is corrupt: stored bytes do not hash to its name")]
    CorruptObject(String),

    #[error("index file could not be deserialized")]
    CorruptIndex,

    #[error("commit {0} is missing from the object store")]
    CommitMissing(String),

    #[error("reference {0} already exists")]
    RefExists(String),

    #[error("reference {0} does not exist")]
    RefMissing(String),

    #[error("branch {0} is checked out and cannot be deleted")]
    BranchInUse(String),

    #[error("merge produced conflicts in: {}", .0.join(", "))]
    MergeConflict(Vec<String>),

    #[error("uncommitted changes would be overwritten; commit or discard them first")]
    DirtyWorkspace,

    #[error("could not acquire the index lock")]
    LockTimeout,

    #[error("storage failure: {0}")]
    IoError(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl RepoError {
    /// Stable exit code for the CLI surface.
    pub fn exit_code(&self) -> i32 {
        match self {
            RepoError::InvalidArgument(_) => 2,
            RepoError::MergeConflict(_) => 3,
            RepoError::DirtyWorkspace => 4,
            RepoError::LockTimeout => 5,
            _ => 1,
        }
    }
}
