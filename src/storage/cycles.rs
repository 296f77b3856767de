//! Cycle outcome storage

use anyhow::Result;
use tracing::debug;
use super::JournalStore;
use crate::types::CycleReport;

impl JournalStore {
    pub fn save_cycle_report(&self, report: &CycleReport) -> Result<()> {
        self.append("cycles", "cycles", report)?;

        debug!(
            cycle = report.cycle,
            status = report.outcome.status(),
            duration_ms = report.duration_ms,
            "Saved cycle report"
        );

        Ok(())
    }
}
