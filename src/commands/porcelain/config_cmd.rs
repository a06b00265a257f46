use crate::areas::repository::Repository;
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    /// `config --list`
    pub async fn config_list(&self) -> anyhow::Result<()> {
        let config = self.config()?;
        for (section, key, value) in config.entries() {
            writeln!(self.writer(), "{}.{}={}", section, key, value)?;
        }
        Ok(())
    }

    /// `config <key>` / `config <key> <value>` / `config --unset <key>`
    pub async fn config_access(
        &self,
        key: &str,
        value: Option<String>,
        unset: bool,
    ) -> anyhow::Result<()> {
        let (section, key) = split_key(key)?;
        let mut config = self.config()?;

        if unset {
            if !config.unset(section, key)? {
                return Err(
                    RepoError::InvalidArgument(format!("{}.{} is not set", section, key)).into(),
                );
            }
            return Ok(());
        }

        match value {
            Some(value) => config.set(section, key, value),
            None => match config.get(section, key) {
                Some(value) => {
                    writeln!(self.writer(), "{}", value)?;
                    Ok(())
                }
                None => Err(
                    RepoError::InvalidArgument(format!("{}.{} is not set", section, key)).into(),
                ),
            },
        }
    }
}

fn split_key(key: &str) -> anyhow::Result<(&str, &str)> {
    key.split_once('.')
        .filter(|(section, key)| !section.is_empty() && !key.is_empty())
        .ok_or_else(|| {
            RepoError::InvalidArgument(format!(
                "config keys use the section.key form, got: {}",
                key
            ))
            .into()
        })
}
