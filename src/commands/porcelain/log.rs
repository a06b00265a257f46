use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::diff::unified::UnifiedFormat;
use crate::artifacts::log::History;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::collections::HashMap;
use std::io::Write;

impl Repository {
    /// Walk history from a revision (default HEAD) and print it in the
    /// medium format, decorated with the refs pointing at each commit.
    pub async fn log(
        &self,
        revision: Option<String>,
        patch: bool,
        max_count: Option<usize>,
    ) -> anyhow::Result<()> {
        let start = match &revision {
            Some(revision) => Revision::try_parse(revision)?.resolve(self)?,
            None => self.refs().head_oid()?,
        };
        let Some(start) = start else {
            return Err(RepoError::InvalidArgument(
                "the current branch does not have any commits yet".into(),
            )
            .into());
        };

        let decorations = self.decorations()?;
        let format = {
            let config = self.config()?;
            UnifiedFormat {
                context: config.diff_context(),
                color: config.diff_color(),
            }
        };

        let history = History::new(self.database()).walk(&start, max_count)?;
        for (oid, commit) in history {
            match decorations.get(&oid) {
                Some(labels) => writeln!(
                    self.writer(),
                    "commit {} ({})",
                    oid,
                    labels.join(", ")
                )?,
                None => writeln!(self.writer(), "commit {}", oid)?,
            }
            writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
            writeln!(
                self.writer(),
                "Date:   {}",
                commit.timestamp().format("%a %b %-d %H:%M:%S %Y %z")
            )?;
            writeln!(self.writer())?;
            for line in commit.message().lines() {
                writeln!(self.writer(), "    {}", line)?;
            }
            writeln!(self.writer())?;

            if patch {
                self.write_commit_patch(&oid, &format)?;
            }
        }

        Ok(())
    }

    /// Ref labels per commit, `HEAD ->` first, tags prefixed.
    fn decorations(&self) -> anyhow::Result<HashMap<ObjectId, Vec<String>>> {
        let head = self.refs().read_head()?;
        let mut decorations: HashMap<ObjectId, Vec<String>> = HashMap::new();

        for (name, oid) in self.refs().list("heads")? {
            let short = name.strip_prefix("refs/heads/").unwrap_or(&name).to_string();
            let label = match &head {
                Head::Symbolic { ref_name, .. } if *ref_name == name => {
                    format!("HEAD -> {}", short)
                }
                _ => short,
            };
            decorations.entry(oid).or_default().push(label);
        }

        for (name, oid) in self.refs().list("tags")? {
            let short = name.strip_prefix("refs/tags/").unwrap_or(&name);
            decorations
                .entry(oid)
                .or_default()
                .push(format!("tag: {}", short));
        }

        if let Head::Direct(oid) = &head {
            decorations
                .entry(oid.clone())
                .or_default()
                .insert(0, "HEAD".to_string());
        }

        // `HEAD -> branch` sorts ahead of plain labels.
        for labels in decorations.values_mut() {
            labels.sort_by_key(|label| !label.starts_with("HEAD"));
        }

        Ok(decorations)
    }
}
