use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::base_finder::MergeBaseFinder;
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    /// List branches, the current one starred.
    pub async fn branch_list(&self) -> anyhow::Result<()> {
        let head = self.refs().read_head()?;
        let current = head.branch_name().map(String::from);

        for name in self.refs().list("heads")?.into_keys() {
            let short = name.strip_prefix("refs/heads/").unwrap_or(&name);
            let marker = if Some(short) == current.as_deref() {
                "* "
            } else {
                "  "
            };
            writeln!(self.writer(), "{}{}", marker, short)?;
        }

        Ok(())
    }

    /// Create a branch at the current HEAD commit.
    pub async fn branch_create(&self, name: &str) -> anyhow::Result<()> {
        let name = BranchName::try_parse(name.to_string())?;
        let ref_path = name.as_ref_path();

        if self.refs().resolve(&ref_path)?.is_some() {
            return Err(RepoError::RefExists(name.to_string()).into());
        }

        let head_oid = self.refs().head_oid()?.ok_or_else(|| {
            RepoError::InvalidArgument("cannot create a branch before the first commit".into())
        })?;

        self.refs().write_ref(&ref_path, &head_oid)?;
        writeln!(self.writer(), "Created branch {}", name)?;

        Ok(())
    }

    /// Delete a branch.
    ///
    /// Deleting the checked-out branch is refused outright. Deleting a
    /// branch whose tip is not an ancestor of HEAD loses commits, so it is
    /// refused unless forced.
    pub async fn branch_delete(&self, name: &str, force: bool) -> anyhow::Result<()> {
        let name = BranchName::try_parse(name.to_string())?;
        let ref_path = name.as_ref_path();

        let head = self.refs().read_head()?;
        if head.branch_name() == Some(name.as_ref()) {
            return Err(RepoError::BranchInUse(name.to_string()).into());
        }

        let tip = self
            .refs()
            .resolve(&ref_path)?
            .ok_or_else(|| RepoError::RefMissing(name.to_string()))?;

        if !force
            && let Some(head_oid) = head.oid()
        {
            let database = self.database();
            let finder = MergeBaseFinder::new(|oid| database.read_slim_commit(oid));
            if !finder.is_ancestor(&tip, head_oid)? {
                return Err(RepoError::InvalidArgument(format!(
                    "branch {} is not fully merged; use -D to force",
                    name
                ))
                .into());
            }
        }

        self.refs().delete_ref(&ref_path)?;
        writeln!(
            self.writer(),
            "Deleted branch {} (was {})",
            name,
            tip.to_short_oid()
        )?;

        Ok(())
    }
}
