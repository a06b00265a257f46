use crate::areas::repository::Repository;
use crate::artifacts::status::report::StatusReport;
use std::io::Write;

impl Repository {
    pub async fn status(&self, porcelain: bool) -> anyhow::Result<StatusReport> {
        let index = self.index();
        let mut index = index.lock().await;
        index.load()?;

        let report = StatusReport::compute(
            self.refs(),
            self.database(),
            self.workspace(),
            &index,
        )?;

        let rendered = if porcelain {
            report.format_porcelain()
        } else {
            report.format_long()
        };
        write!(self.writer(), "{}", rendered)?;

        Ok(report)
    }
}
