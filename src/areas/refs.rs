//! References (branches, tags, HEAD)
//!
//! References are human-readable names pointing at commits. A reference file
//! holds one of:
//! - a 64-character object id (direct reference)
//! - `ref: <path>` (symbolic reference, chased to a bounded depth)
//! - a JSON annotated-tag record (tags created with a message)
//!
//! `HEAD` is the distinguished reference naming the checked-out branch, or a
//! commit directly when detached. `MERGE_HEAD` exists only while a merge is
//! pending user resolution.
//!
//! Individual reference files are rewritten atomically (temp file + rename);
//! multi-reference sequences are the caller's responsibility to serialize.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tag::TagRecord;
use crate::errors::RepoError;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Name of the pending-merge marker
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";

/// Maximum symbolic-reference chase depth before giving up
const MAX_SYMREF_DEPTH: usize = 5;

/// What the HEAD file currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// `ref: refs/heads/<branch>`; `resolved` is None before the first commit
    Symbolic {
        ref_name: String,
        resolved: Option<ObjectId>,
    },
    /// Detached: HEAD names a commit directly
    Direct(ObjectId),
}

impl Head {
    pub fn oid(&self) -> Option<&ObjectId> {
        match self {
            Head::Symbolic { resolved, .. } => resolved.as_ref(),
            Head::Direct(oid) => Some(oid),
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Direct(_))
    }

    /// Branch name when HEAD is symbolic into `refs/heads/`.
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Head::Symbolic { ref_name, .. } => ref_name.strip_prefix("refs/heads/"),
            Head::Direct(_) => None,
        }
    }
}

/// Parsed content of one reference file.
#[derive(Debug, Clone)]
enum RefContent {
    SymRef(String),
    Oid(ObjectId),
    Tag(Box<TagRecord>),
}

impl RefContent {
    fn read(path: &Path) -> anyhow::Result<Option<RefContent>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if content.starts_with('{') {
            let record: TagRecord = serde_json::from_str(content)
                .with_context(|| format!("malformed tag record at {:?}", path))?;
            return Ok(Some(RefContent::Tag(Box::new(record))));
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(RefContent::SymRef(symref_match[1].to_string())))
        } else {
            Ok(Some(RefContent::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

/// Reference manager rooted at the control directory.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the control directory (typically `.dotgit`)
    path: Box<Path>,
}

impl Refs {
    /// Atomically write a direct reference, creating parent directories.
    pub fn write_ref(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(name, oid.as_ref())
    }

    /// Read a reference and chase it to a commit id.
    ///
    /// Missing references are `None`, not an error. Symbolic chains longer
    /// than the chase bound (which covers cycles) are `InvalidHead`.
    pub fn resolve(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        self.resolve_at_depth(name, 0)
    }

    /// Alias for `resolve` matching the direct-read vocabulary.
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(name)
    }

    /// Delete a reference file. Returns whether it existed.
    pub fn delete_ref(&self, name: &str) -> anyhow::Result<bool> {
        let ref_path = self.path.join(name);

        if !ref_path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(&ref_path)
            .with_context(|| format!("failed to delete ref file at {:?}", ref_path))?;
        self.prune_empty_parent_dirs(&ref_path)?;
        debug!(name, "deleted ref");

        Ok(true)
    }

    /// List references under `refs/<prefix>/` as name → resolved id.
    pub fn list(&self, prefix: &str) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let root = self.path.join("refs").join(prefix);
        let mut refs = BTreeMap::new();

        if !root.exists() {
            return Ok(refs);
        }

        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            if !entry.path().is_file() {
                continue;
            }
            let name = entry
                .path()
                .strip_prefix(self.path.as_ref())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();

            if let Some(oid) = self.resolve(&name)? {
                refs.insert(name, oid);
            }
        }

        Ok(refs)
    }

    /// Point HEAD at a branch reference.
    pub fn set_head_symbolic(&self, ref_name: &str) -> anyhow::Result<()> {
        self.write_ref_file(HEAD_REF_NAME, &format!("ref: {}", ref_name))
    }

    /// Detach HEAD onto a commit.
    pub fn set_head_detached(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(HEAD_REF_NAME, oid.as_ref())
    }

    /// Read and classify HEAD.
    ///
    /// A missing HEAD in an initialized repository, a malformed line, and a
    /// symbolic cycle are all `InvalidHead`.
    pub fn read_head(&self) -> anyhow::Result<Head> {
        let head_path = self.path.join(HEAD_REF_NAME);
        let content = RefContent::read(&head_path)
            .map_err(|_| RepoError::InvalidHead("unreadable HEAD".to_string()))?;

        match content {
            None => Err(RepoError::InvalidHead("HEAD is missing".to_string()).into()),
            Some(RefContent::Oid(oid)) => Ok(Head::Direct(oid)),
            Some(RefContent::SymRef(ref_name)) => {
                let resolved = self.resolve_at_depth(&ref_name, 1)?;
                Ok(Head::Symbolic { ref_name, resolved })
            }
            Some(RefContent::Tag(_)) => {
                Err(RepoError::InvalidHead("HEAD holds a tag record".to_string()).into())
            }
        }
    }

    /// Commit id HEAD currently resolves to, if any commits exist.
    pub fn head_oid(&self) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.read_head()?.oid().cloned())
    }

    /// Advance whatever HEAD points at: the checked-out branch, or HEAD
    /// itself when detached.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.read_head()? {
            Head::Symbolic { ref_name, .. } => self.write_ref(&ref_name, oid),
            Head::Direct(_) => self.set_head_detached(oid),
        }
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(MERGE_HEAD_REF_NAME, oid.as_ref())
    }

    pub fn read_merge_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match RefContent::read(&self.path.join(MERGE_HEAD_REF_NAME))? {
            Some(RefContent::Oid(oid)) => Ok(Some(oid)),
            Some(_) => Err(RepoError::InvalidHead("malformed MERGE_HEAD".to_string()).into()),
            None => Ok(None),
        }
    }

    pub fn clear_merge_head(&self) -> anyhow::Result<()> {
        let path = self.path.join(MERGE_HEAD_REF_NAME);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {:?}", path))?;
        }
        Ok(())
    }

    /// Store an annotated tag record under `refs/tags/<name>`.
    pub fn write_tag_record(&self, name: &str, record: &TagRecord) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        self.write_ref_file(&format!("refs/tags/{}", name), &content)
    }

    /// Read the annotated record of a tag, if it has one.
    pub fn read_tag_record(&self, name: &str) -> anyhow::Result<Option<TagRecord>> {
        match RefContent::read(&self.path.join("refs/tags").join(name))? {
            Some(RefContent::Tag(record)) => Ok(Some(*record)),
            _ => Ok(None),
        }
    }

    fn resolve_at_depth(&self, name: &str, depth: usize) -> anyhow::Result<Option<ObjectId>> {
        if depth > MAX_SYMREF_DEPTH {
            return Err(RepoError::InvalidHead(format!(
                "symbolic reference chain through {} exceeds depth {}",
                name, MAX_SYMREF_DEPTH
            ))
            .into());
        }

        match RefContent::read(&self.path.join(name))? {
            None => Ok(None),
            Some(RefContent::Oid(oid)) => Ok(Some(oid)),
            Some(RefContent::Tag(record)) => Ok(Some(record.object)),
            Some(RefContent::SymRef(target)) => self.resolve_at_depth(&target, depth + 1),
        }
    }

    fn write_ref_file(&self, name: &str, content: &str) -> anyhow::Result<()> {
        let ref_path = self.path.join(name);
        let parent = ref_path
            .parent()
            .with_context(|| format!("invalid ref path {:?}", ref_path))?;

        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create ref directories for {:?}", ref_path))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .context("failed to create temporary ref file")?;
        writeln!(temp, "{}", content)?;
        temp.persist(&ref_path)
            .with_context(|| format!("failed to write ref file at {:?}", ref_path))?;

        Ok(())
    }

    /// Remove directories a ref deletion emptied, keeping the control root,
    /// `refs/`, and the category directories (`refs/heads`, `refs/tags`, ...)
    /// in place.
    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        let refs_root = self.path.join("refs");
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent != refs_root.as_path()
            && parent.parent() != Some(refs_root.as_path())
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("failed to remove empty ref directory {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
