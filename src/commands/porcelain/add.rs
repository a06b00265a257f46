use crate::areas::repository::Repository;
use crate::errors::RepoError;

impl Repository {
    /// Stage the files matched by each path argument.
    ///
    /// Arguments expand like the workspace walker sees them: `.`, files,
    /// directories, and `*`-wildcards. Indexed paths covered by an argument
    /// that no longer exist in the workspace are unstaged, so `add .` after
    /// a deletion records it.
    pub async fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        if paths.is_empty() {
            return Err(RepoError::InvalidArgument("nothing specified, nothing added".into()).into());
        }

        let index = self.index();
        let mut index = index.lock().await;

        for raw in paths {
            let matches = self.workspace().expand_path(raw)?;

            for path in &matches {
                let content = match self.workspace().read_file(path) {
                    Ok(content) => content,
                    // Unreadable files are skipped, not fatal.
                    Err(_) => continue,
                };
                let Some(stat) = self.workspace().stat_file(path)? else {
                    continue;
                };

                index.stage(self.database(), path.clone(), content, &stat)?;
            }

            // Record deletions under this argument.
            index.load()?;
            let vanished: Vec<String> = index
                .entries()
                .map(|(path, _)| path.clone())
                .filter(|path| argument_covers(raw, path))
                .filter(|path| {
                    self.workspace()
                        .stat_file(path)
                        .map(|stat| stat.is_none())
                        .unwrap_or(false)
                })
                .collect();
            for path in vanished {
                index.unstage(&path)?;
            }
        }

        Ok(())
    }
}

fn argument_covers(raw: &str, path: &str) -> bool {
    raw == "."
        || path == raw
        || path.starts_with(&format!("{}/", raw.trim_end_matches('/')))
}
