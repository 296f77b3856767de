//! Fixed-interval cycle loop

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};
use super::{Agent, SessionStats};
use crate::{
    errors::BotResult,
    risk::daily_reset,
    storage::JournalStore,
    types::{CycleReport, RiskState},
    utils,
};

/// True once the UTC calendar day has moved past the last reset.
pub fn needs_daily_reset(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.date_naive() > last_reset.date_naive()
}

pub struct Scheduler {
    interval: Duration,
    store: JournalStore,
    stats: SessionStats,
}

impl Scheduler {
    pub fn new(interval: Duration, store: JournalStore) -> Self {
        Self {
            interval,
            store,
            stats: SessionStats::new(),
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Runs cycles until `shutdown` fires or a fatal error occurs. A cycle
    /// that has started always runs to completion. Returns the final ledger.
    pub async fn run(
        &mut self,
        agent: &mut Agent,
        mut state: RiskState,
        mut shutdown: oneshot::Receiver<()>,
    ) -> BotResult<RiskState> {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("🚀 Starting decision loop every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state = self.tick(agent, state).await?;
                }
                _ = &mut shutdown => {
                    info!("📛 Shutdown signal received, exiting decision loop...");
                    break;
                }
            }
        }

        utils::print_session_stats(&self.stats, &state, agent.recovery().error_counts());
        Ok(state)
    }

    /// Runs exactly one cycle, journals its outcome and returns the next ledger.
    pub async fn tick(&mut self, agent: &mut Agent, mut state: RiskState) -> BotResult<RiskState> {
        let now = Utc::now();
        if needs_daily_reset(state.last_reset, now) {
            info!(
                "🌅 New trading day, resetting daily loss {:.4} (breaker was {})",
                state.daily_loss,
                if state.circuit_breaker_active { "OPEN" } else { "CLOSED" }
            );
            state = daily_reset(&state);
            self.stats.daily_resets += 1;
        }

        let started = Instant::now();
        let step = match agent.run_cycle(&state).await {
            Ok(step) => step,
            Err(e) => {
                error!("Cycle {} aborted: {}", self.stats.cycles + 1, e);
                utils::print_session_stats(&self.stats, &state, agent.recovery().error_counts());
                return Err(e);
            }
        };
        self.stats.record(&step.outcome);

        let report = CycleReport {
            cycle: self.stats.cycles,
            started_at: now,
            duration_ms: started.elapsed().as_millis() as u64,
            outcome: step.outcome,
        };
        info!(
            cycle = report.cycle,
            status = report.outcome.status(),
            duration_ms = report.duration_ms,
            "Cycle finished: {}",
            report.outcome.reason()
        );

        if let Err(e) = self.store.save_cycle_report(&report) {
            warn!("Failed to save cycle report: {}", e);
        }
        if let Some(execution) = report.outcome.execution() {
            if let Err(e) = self.store.save_execution(execution) {
                warn!("Failed to save execution: {}", e);
            }
        }

        if step.state.circuit_breaker_active && !state.circuit_breaker_active {
            error!(
                "⚡ Circuit breaker OPEN: daily loss {:.4} exceeds limit, trading halted until reset",
                step.state.daily_loss
            );
        }
        if self.stats.should_print() {
            utils::print_session_stats(&self.stats, &step.state, agent.recovery().error_counts());
        }

        Ok(step.state)
    }
}
