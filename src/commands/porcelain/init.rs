use crate::areas::config::Config;
use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub async fn init(&self) -> anyhow::Result<()> {
        self.ensure_uninitialized()?;

        let control = self.control_path();
        fs::create_dir_all(control.join("objects"))
            .context("Failed to create the objects directory")?;
        for refs_dir in ["refs/heads", "refs/tags", "refs/remotes"] {
            fs::create_dir_all(control.join(refs_dir))
                .with_context(|| format!("Failed to create {}", refs_dir))?;
        }

        // Persist the synthesized defaults so `branch.default` answers before
        // any explicit `config` call.
        let config = Config::load(&control.join("config"))?;
        config.save()?;

        self.refs()
            .set_head_symbolic(&format!("refs/heads/{}", config.default_branch()))?;

        // The index starts as an empty document.
        let index = self.index();
        let index = index.lock().await;
        index.write_to_disk()?;

        writeln!(
            self.writer(),
            "Initialized empty repository in {}",
            control.display()
        )?;

        Ok(())
    }
}
