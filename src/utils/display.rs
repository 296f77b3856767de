//! Display and printing utilities

use std::collections::HashMap;
use tracing::{error, info, warn};
use crate::{
    pipeline::SessionStats,
    types::{ArbitrageOpportunity, ExecutionResult, ExecutionStatus, RiskState, SettlementStatus},
};

pub fn print_session_stats(stats: &SessionStats, state: &RiskState, error_counts: &HashMap<&'static str, u32>) {
    info!("\n📊 Session Statistics ({} minutes)", stats.runtime_minutes());
    info!("   🔁 CYCLES:");
    info!("     Total: {}", stats.cycles);
    info!("     Skipped: {}", stats.skipped);
    info!("     Rejected: {}", stats.rejected);
    info!("     Reached execution: {:.1}%", stats.execution_rate_pct());

    info!("   🚀 TRADE EXECUTION:");
    info!("     Confirmed: {}", stats.confirmed);
    info!("     Failed: {}", stats.failed);
    if stats.unresolved > 0 {
        info!("     Unresolved: {}", stats.unresolved);
    }
    info!("     Settlement failures: {}", stats.partial_failures);
    info!("     Session profit: {:.4}", stats.realized_profit);

    info!("   🛡️  RISK:");
    info!("     Win rate: {:.1}% ({} of {})", state.win_rate_pct(), state.win_count, state.total_trades);
    info!("     Total profit: {:.4}", state.total_profit);
    info!("     Daily loss: {:.4}", state.daily_loss);
    info!("     Open exposure: {:.2}", state.current_exposure);
    info!(
        "     Circuit breaker: {}",
        if state.circuit_breaker_active { "OPEN" } else { "CLOSED" }
    );
    if stats.daily_resets > 0 {
        info!("     Daily resets: {}", stats.daily_resets);
    }

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_arbitrage_opportunity(opportunity: &ArbitrageOpportunity) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY #{}", opportunity.id);
    warn!("📋 Strategy: buy on {:?}, sell on {:?}", opportunity.buy_venue, opportunity.sell_venue);
    warn!("💰 Profit Analysis:");
    warn!("   CEX Price: {:.4}", opportunity.cex_price);
    warn!("   DEX Price: {:.4}", opportunity.dex_price);
    warn!("   Spread: {:.3}%", opportunity.spread_pct);
    warn!("   Position: {:.2}", opportunity.position_size);
    warn!("   Gross Profit: {:.4}", opportunity.gross_profit);
    warn!("   Gas Cost: {:.4}", opportunity.gas_cost);
    warn!("   Net Profit: {:.4}", opportunity.net_profit);
    warn!("📊 Confidence: {} ({:?})", opportunity.confidence, opportunity.recommendation);
}

pub fn print_trade_execution(execution: &ExecutionResult) {
    match execution.status {
        ExecutionStatus::Confirmed => {
            warn!("\n✅ TRADE EXECUTION #{}", execution.id);
            warn!("💰 Execution Details:");
            warn!("   Type: {:?}", execution.trade_type);
            if let Some(tx_ref) = &execution.tx_ref {
                warn!("   Tx: {}", tx_ref);
            }
            warn!("   Expected Profit: {:.4}", execution.expected_profit);
            warn!("   Realized Profit: {:.4}", execution.profit);
            warn!("   Gas: {} units, cost {:.4}", execution.gas_used, execution.gas_cost);
            warn!("   Efficiency: {:.2}", execution.efficiency);
            match &execution.settlement {
                SettlementStatus::Delivered { tx_ref } => warn!("   Settlement: {}", tx_ref),
                SettlementStatus::Failed { error } => error!("   ⚠️  Settlement FAILED, position left open: {}", error),
                SettlementStatus::NotAttempted => {}
            }
            warn!("   Execution Time: {}ms", execution.execution_time_ms);
        }
        ExecutionStatus::Pending => {
            warn!("\n⏳ TRADE EXECUTION UNRESOLVED #{}", execution.id);
            if let Some(tx_ref) = &execution.tx_ref {
                warn!("   Tx: {}", tx_ref);
            }
            warn!("   Position held open: {:.2}", execution.position_size);
        }
        ExecutionStatus::Failed => {
            error!("\n❌ TRADE EXECUTION FAILED #{}", execution.id);
            error!("   Phase: {:?}", execution.phase);
            error!("   Error: {}", execution.error_message.as_deref().unwrap_or("Unknown"));
            if execution.gas_used > 0 {
                error!("   Gas burned: {} units, cost {:.4}", execution.gas_used, execution.gas_cost);
            }
        }
    }
}
