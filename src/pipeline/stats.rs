//! Session statistics

use rust_decimal::Decimal;
use std::time::Instant;
use crate::types::CycleOutcome;

/// Print a summary every this many cycles.
pub const STATS_PRINT_INTERVAL: u64 = 20;

#[derive(Debug, Clone)]
pub struct SessionStats {
    pub started: Instant,
    pub cycles: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub failed: u64,
    pub unresolved: u64,
    pub confirmed: u64,
    pub partial_failures: u64,
    pub daily_resets: u64,
    pub realized_profit: Decimal,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            cycles: 0,
            skipped: 0,
            rejected: 0,
            failed: 0,
            unresolved: 0,
            confirmed: 0,
            partial_failures: 0,
            daily_resets: 0,
            realized_profit: Decimal::ZERO,
        }
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Skipped { .. } => self.skipped += 1,
            CycleOutcome::Rejected { .. } => self.rejected += 1,
            CycleOutcome::Failed { execution } => {
                self.failed += 1;
                self.realized_profit += execution.profit;
            }
            CycleOutcome::Unresolved { .. } => self.unresolved += 1,
            CycleOutcome::Confirmed { execution } => {
                self.confirmed += 1;
                if execution.is_partial_failure() {
                    self.partial_failures += 1;
                }
                self.realized_profit += execution.profit;
            }
        }
    }

    pub fn executions(&self) -> u64 {
        self.failed + self.unresolved + self.confirmed
    }

    /// Share of cycles that reached the chain, in percent.
    pub fn execution_rate_pct(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.executions() as f64 / self.cycles as f64 * 100.0
    }

    pub fn should_print(&self) -> bool {
        self.cycles > 0 && self.cycles % STATS_PRINT_INTERVAL == 0
    }

    pub fn runtime_minutes(&self) -> u64 {
        self.started.elapsed().as_secs() / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Recommendation, RejectionStage, SkipReason};

    #[test]
    fn counts_each_outcome_once() {
        let mut stats = SessionStats::new();
        stats.record(&CycleOutcome::Skipped {
            reason: SkipReason::Unprofitable {
                recommendation: Recommendation::Skip,
                net_profit: Decimal::ZERO,
            },
        });
        stats.record(&CycleOutcome::Rejected {
            stage: RejectionStage::Risk,
            opportunity_id: "opp".into(),
            reasons: vec!["too large".into()],
        });

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.executions(), 0);
        assert_eq!(stats.execution_rate_pct(), 0.0);
        assert!(!stats.should_print());
    }
}
