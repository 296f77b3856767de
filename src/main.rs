//! Spread Settle Bot - Main Entry Point

use spread_settle_bot::*;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use spread_settle_bot::{
    advisory::{AdvisoryGate, AdvisoryService, HttpAdvisoryClient},
    arbitrage::SpreadAnalyzer,
    events::EventBus,
    execution::{AlloyChainSubmitter, ChainSubmitter, ExecutionCoordinator, ExecutionSettings, SimulatedSubmitter},
    network::{HttpPriceSource, PriceSource, ProviderGasEstimator, RouterQuoteSource},
    pipeline::{Agent, MarketSettings, MarketSources, Scheduler},
    risk::{PerformanceTracker, RiskValidator},
    settlement::SettlementSigner,
    storage::{spawn_event_journal, JournalStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let store = JournalStore::default();
    let _logging_guard = utils::setup_logging(store.root())?;
    store.prepare()?;

    let config = CONFIG.clone();
    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        std::process::exit(2);
    }

    info!("🤖 Spread Settle Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Symbol: {}", config.cex_symbol);
    info!("   Position Size: {}", config.position_size);
    info!("   Max Position Size: {}", config.max_position_size);
    info!("   Max Daily Loss: {}%", config.max_daily_loss_pct);
    info!("   Exposure Ceiling: {}x", config.exposure_ceiling_multiplier);
    info!("   Slippage Tolerance: {} bps", config.slippage_bps);
    info!("   Scan Interval: {}s", config.scan_interval_secs);
    info!("   Advisory: {}", config.advisory_url.as_deref().unwrap_or("disabled"));
    info!("   Trade Execution: {}", config.enable_trade_execution);

    // validate() guarantees the key is present
    let private_key = config.private_key.clone().unwrap_or_default();

    let provider = network::setup_provider(&config).await?;

    let price_source: Arc<dyn PriceSource> = Arc::new(HttpPriceSource::new(config.cex_price_url.clone())?);
    let sources = MarketSources {
        price: price_source.clone(),
        pool: Arc::new(RouterQuoteSource::new(provider.clone(), config.dex_router)),
        gas: Arc::new(ProviderGasEstimator::new(provider.clone(), price_source, config.native_symbol.clone())),
    };

    let submitter: Arc<dyn ChainSubmitter> = if config.enable_trade_execution {
        let wallet_provider = network::setup_wallet_provider(provider.clone(), &private_key)?;
        warn!("⚠️  LIVE MODE - swaps and settlements are sent on-chain");
        Arc::new(AlloyChainSubmitter::new(wallet_provider, &config))
    } else {
        info!("🎭 Dry-run mode - trades are simulated");
        Arc::new(SimulatedSubmitter::new())
    };

    let signer = SettlementSigner::from_private_key(&private_key)?;
    info!("🔑 Settlement signer: {}", signer.address());

    let advisor: Option<Arc<dyn AdvisoryService>> = match &config.advisory_url {
        Some(url) => Some(Arc::new(HttpAdvisoryClient::new(
            url.clone(),
            config.advisory_api_key.clone(),
            Duration::from_secs(config.advisory_timeout_secs),
        )?)),
        None => None,
    };

    let events = EventBus::default();
    let journal = spawn_event_journal(store.clone(), events.subscribe());

    let limits = config.risk_limits();
    let mut agent = Agent::new(
        sources,
        MarketSettings::from_config(&config),
        SpreadAnalyzer::from_config(&config),
        AdvisoryGate::from_config(&config, advisor),
        RiskValidator::new(limits.clone()),
        ExecutionCoordinator::new(submitter, signer, ExecutionSettings::from_config(&config), events.clone()),
        PerformanceTracker::new(limits),
        events,
    );

    // Setup shutdown handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("\n📛 Received shutdown signal (Ctrl+C)..."),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(());
    });

    let mut scheduler = Scheduler::new(Duration::from_secs(config.scan_interval_secs), store);
    let result = scheduler.run(&mut agent, RiskState::default(), shutdown_rx).await;

    // Dropping the agent closes the event bus so the journal drains and exits.
    drop(agent);
    let _ = journal.await;

    match result {
        Ok(state) => {
            info!("🛑 Shut down gracefully");
            info!("   Trades: {} | Total profit: {:.4}", state.total_trades, state.total_profit);
            Ok(())
        }
        Err(e) => {
            error!("🛑 Stopping on fatal error: {}", e);
            std::process::exit(1);
        }
    }
}
