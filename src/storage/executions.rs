//! Trade execution storage

use anyhow::Result;
use tracing::info;
use super::JournalStore;
use crate::types::ExecutionResult;

impl JournalStore {
    pub fn save_execution(&self, execution: &ExecutionResult) -> Result<()> {
        self.append("executions", "trades", execution)?;

        info!(
            execution_id = %execution.id,
            status = ?execution.status,
            profit = %execution.profit,
            "Saved trade execution"
        );

        Ok(())
    }
}
