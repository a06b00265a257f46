use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub async fn remote_add(&self, name: &str, url: &str) -> anyhow::Result<()> {
        let mut remotes = self.remotes()?;
        remotes.add(name.to_string(), url.to_string())?;
        Ok(())
    }

    pub async fn remote_remove(&self, name: &str) -> anyhow::Result<()> {
        let mut remotes = self.remotes()?;
        remotes.remove(name)?;
        Ok(())
    }

    pub async fn remote_list(&self) -> anyhow::Result<()> {
        let remotes = self.remotes()?;
        for (name, url) in remotes.list() {
            writeln!(self.writer(), "{}\t{}", name, url)?;
        }
        Ok(())
    }
}
