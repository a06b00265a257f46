//! Revision specification parsing and resolution
//!
//! A revision names a commit: `HEAD`, a branch or tag name, a full or
//! abbreviated object id, or any of those with parent (`^`) / ancestor
//! (`~n`) suffixes. Names win over ids when both could apply, matching the
//! usual expectation.

use crate::areas::repository::Repository;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::{MIN_ABBREV_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::RepoError;

#[derive(Debug, Clone)]
pub enum Revision {
    /// A branch, tag, `HEAD`, or something id-shaped (decided at resolution)
    Ref(String),
    /// First parent of a revision (e.g., `HEAD^`)
    Parent(Box<Revision>),
    /// Nth first-parent ancestor of a revision (e.g., `HEAD~3`)
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(raw: &str) -> anyhow::Result<Self> {
        if raw.is_empty() {
            return Err(RepoError::InvalidArgument("empty revision".to_string()).into());
        }

        if let Some(captures) = regex::Regex::new(PARENT_REGEX)?.captures(raw) {
            return Ok(Revision::Parent(Box::new(Self::try_parse(&captures[1])?)));
        }

        if let Some(captures) = regex::Regex::new(ANCESTOR_REGEX)?.captures(raw) {
            let generations = captures[2]
                .parse::<usize>()
                .map_err(|_| RepoError::InvalidArgument(format!("bad revision: {}", raw)))?;
            return Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&captures[1])?),
                generations,
            ));
        }

        Ok(Revision::Ref(raw.to_string()))
    }

    /// Resolve to a commit id, or `None` when the name exists but has no
    /// commits yet (an unborn branch).
    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        match self {
            Revision::Ref(name) => Self::resolve_name(name, repository),
            Revision::Parent(base) => {
                Self::first_parent(base.resolve(repository)?, repository)
            }
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(oid, repository)?;
                }
                Ok(oid)
            }
        }
    }

    fn resolve_name(name: &str, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        let refs = repository.refs();

        if name == "HEAD" {
            return refs.head_oid();
        }

        for candidate in [
            format!("refs/heads/{}", name),
            format!("refs/tags/{}", name),
            name.to_string(),
        ] {
            if let Some(oid) = refs.resolve(&candidate)? {
                return Ok(Some(oid));
            }
        }

        if Self::looks_like_oid(name) {
            return Self::resolve_oid(name, repository).map(Some);
        }

        Err(RepoError::RefMissing(name.to_string()).into())
    }

    fn first_parent(
        oid: Option<ObjectId>,
        repository: &Repository,
    ) -> anyhow::Result<Option<ObjectId>> {
        match oid {
            Some(oid) => {
                let commit = repository.database().read_commit(&oid)?;
                Ok(commit.first_parent().cloned())
            }
            None => Ok(None),
        }
    }

    fn looks_like_oid(name: &str) -> bool {
        name.len() >= MIN_ABBREV_LENGTH
            && name.len() <= OBJECT_ID_LENGTH
            && name.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn resolve_oid(raw: &str, repository: &Repository) -> anyhow::Result<ObjectId> {
        if raw.len() == OBJECT_ID_LENGTH {
            return ObjectId::try_parse(raw.to_string());
        }

        let mut matches = repository.database().find_objects_by_prefix(raw)?;
        match matches.len() {
            0 => Err(RepoError::InvalidArgument(format!("unknown revision: {}", raw)).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(RepoError::InvalidArgument(format!(
                "ambiguous object id prefix: {} ({} candidates)",
                raw,
                matches.len()
            ))
            .into()),
        }
    }
}
