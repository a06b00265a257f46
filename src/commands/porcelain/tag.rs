use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::tag::TagRecord;
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    pub async fn tag_list(&self) -> anyhow::Result<()> {
        for name in self.refs().list("tags")?.into_keys() {
            let short = name.strip_prefix("refs/tags/").unwrap_or(&name);
            writeln!(self.writer(), "{}", short)?;
        }
        Ok(())
    }

    /// Create a tag at HEAD: lightweight without a message, annotated with.
    pub async fn tag_create(&self, name: &str, message: Option<String>) -> anyhow::Result<()> {
        // Tag names obey the same file-layout rules as branch names.
        let name = BranchName::try_parse(name.to_string())?;
        let ref_path = format!("refs/tags/{}", name);

        if self.refs().resolve(&ref_path)?.is_some() {
            return Err(RepoError::RefExists(name.to_string()).into());
        }

        let head_oid = self.refs().head_oid()?.ok_or_else(|| {
            RepoError::InvalidArgument("cannot tag before the first commit".into())
        })?;

        match message {
            Some(message) => {
                let record = TagRecord::new(
                    head_oid,
                    self.resolve_author()?,
                    self.author_timestamp(),
                    message,
                );
                self.refs().write_tag_record(name.as_ref(), &record)?;
            }
            None => self.refs().write_ref(&ref_path, &head_oid)?,
        }

        writeln!(self.writer(), "Created tag {}", name)?;
        Ok(())
    }

    pub async fn tag_delete(&self, name: &str) -> anyhow::Result<()> {
        let ref_path = format!("refs/tags/{}", name);

        if !self.refs().delete_ref(&ref_path)? {
            return Err(RepoError::RefMissing(name.to_string()).into());
        }

        writeln!(self.writer(), "Deleted tag {}", name)?;
        Ok(())
    }
}
