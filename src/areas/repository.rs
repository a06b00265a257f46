//! Repository handle and coordination
//!
//! `Repository` is the facade over the lower-level areas (database, index,
//! workspace, refs, config) and the receiver for every porcelain and
//! plumbing command. The control directory *is* the global state; the handle
//! just points at it, so no process-wide singletons exist.
//!
//! The index lives behind `Arc<Mutex<_>>` so async operations share it
//! safely; cross-process coherence comes from the index lock file, not from
//! this mutex.

use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::remotes::Remotes;
use crate::areas::workspace::{CONTROL_DIR, Workspace};
use crate::artifacts::objects::commit::Author;
use crate::errors::RepoError;
use chrono::{DateTime, FixedOffset};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Object database directory name
const DATABASE_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

/// Config file name
const CONFIG_FILE: &str = "config";

/// Remotes registry file name
const REMOTES_FILE: &str = "remotes";

pub struct Repository {
    /// Workspace root path
    path: Box<Path>,
    /// Output writer (stdout in the CLI, a buffer in tests)
    writer: RefCell<Box<dyn std::io::Write>>,
    /// Staging index, shared across async operations
    index: Arc<Mutex<Index>>,
    /// Object database
    database: Database,
    /// Working directory
    workspace: Workspace,
    /// Reference manager
    refs: Refs,
}

impl Repository {
    /// Create a handle rooted at `path` without requiring an initialized
    /// control directory. Used by `init`; everything else goes through
    /// [`Repository::open`].
    pub fn new(path: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        let path = path.canonicalize()?;
        let control = path.join(CONTROL_DIR);

        Ok(Repository {
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(Index::new(
                control.join(INDEX_FILE).into_boxed_path(),
            ))),
            database: Database::new(control.join(DATABASE_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(control.into_boxed_path()),
            path: path.into_boxed_path(),
        })
    }

    /// Open an existing repository, discovering the control directory in
    /// `start` or any of its ancestors.
    pub fn open(start: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start.canonicalize()?;
        let root = Self::discover(&start).ok_or(RepoError::RepositoryNotFound)?;
        Self::new(root, writer)
    }

    fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(CONTROL_DIR).is_dir() {
                return Some(dir.to_path_buf());
            }
            current = dir.parent();
        }
        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn control_path(&self) -> PathBuf {
        self.path.join(CONTROL_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Load the config document on demand.
    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(&self.control_path().join(CONFIG_FILE))
    }

    /// Load the remote registry on demand.
    pub fn remotes(&self) -> anyhow::Result<Remotes> {
        Remotes::load(&self.control_path().join(REMOTES_FILE))
    }

    /// Resolve the commit author from config, falling back to the
    /// environment (`DOTGIT_AUTHOR_NAME` / `DOTGIT_AUTHOR_EMAIL`).
    pub fn resolve_author(&self) -> anyhow::Result<Author> {
        let config = self.config()?;

        let name = config
            .get("user", "name")
            .map(String::from)
            .or_else(|| std::env::var("DOTGIT_AUTHOR_NAME").ok());
        let email = config
            .get("user", "email")
            .map(String::from)
            .or_else(|| std::env::var("DOTGIT_AUTHOR_EMAIL").ok());

        match (name, email) {
            (Some(name), Some(email)) => Ok(Author::new(name, email)),
            _ => Err(RepoError::InvalidArgument(
                "author identity not configured; set user.name and user.email".to_string(),
            )
            .into()),
        }
    }

    /// Commit timestamp: `DOTGIT_AUTHOR_DATE` (RFC 3339) when set, the
    /// current local time otherwise.
    pub fn author_timestamp(&self) -> DateTime<FixedOffset> {
        std::env::var("DOTGIT_AUTHOR_DATE")
            .ok()
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    /// Fail with `RepositoryExists` when `init` targets an initialized
    /// workspace.
    pub fn ensure_uninitialized(&self) -> anyhow::Result<()> {
        if self.control_path().is_dir() {
            return Err(RepoError::RepositoryExists(self.path.to_path_buf()).into());
        }
        Ok(())
    }
}
