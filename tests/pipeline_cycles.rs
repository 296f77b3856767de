//! End-to-end decision cycles against in-memory market data and a simulated chain

mod common;

use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use spread_settle_bot::{events::EventBus, execution::SimulatedSubmitter, settlement::verify_payload, types::*};
use tokio_test::assert_ok;

#[tokio::test]
async fn confirmed_trade_is_settled_and_closes_exposure() {
    let harness = Harness::profitable();
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut agent = harness.build(events);

    let step = assert_ok!(agent.run_cycle(&RiskState::default()).await);

    let CycleOutcome::Confirmed { execution } = &step.outcome else {
        panic!("expected confirmed, got {:?}", step.outcome);
    };
    assert_eq!(execution.trade_type, TradeType::BuyDexSellCex);
    assert!(matches!(execution.settlement, SettlementStatus::Delivered { .. }));
    // 10 gross minus 2 × 156k/200k gas
    assert_eq!(execution.profit, dec!(8.44));

    assert_eq!(step.state.total_trades, 1);
    assert_eq!(step.state.win_count, 1);
    assert_eq!(step.state.current_exposure, Decimal::ZERO);
    assert_eq!(step.state.total_profit, dec!(8.44));

    let settlements = harness.submitter.submitted_settlements().await;
    assert_eq!(settlements.len(), 1);
    assert!(verify_payload(&settlements[0]));
    assert_eq!(settlements[0].token, WETH_BASE);

    let names: Vec<_> = drain(&mut rx).iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["opportunity-detected", "trade-executing", "trade-completed"]);
}

#[tokio::test]
async fn settlement_failure_is_partial_and_keeps_exposure_open() {
    let harness = Harness {
        submitter: Arc::new(SimulatedSubmitter::new().failing_settlements()),
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let step = agent.run_cycle(&RiskState::default()).await.unwrap();

    let execution = step.outcome.execution().unwrap();
    assert_eq!(step.outcome.status(), "confirmed");
    assert!(execution.is_partial_failure());
    assert_eq!(step.state.current_exposure, dec!(1000));
}

#[tokio::test]
async fn reverted_trade_fails_without_exposure() {
    let harness = Harness {
        submitter: Arc::new(SimulatedSubmitter::new().reverting_trades()),
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let step = agent.run_cycle(&RiskState::default()).await.unwrap();

    let CycleOutcome::Failed { execution } = &step.outcome else {
        panic!("expected failed, got {:?}", step.outcome);
    };
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.profit, dec!(-1.56));
    assert!(harness.submitter.submitted_settlements().await.is_empty());
    assert_eq!(step.state.loss_count, 1);
    assert_eq!(step.state.current_exposure, Decimal::ZERO);
}

#[tokio::test]
async fn timed_out_trade_holds_exposure_until_reconciled() {
    let harness = Harness {
        submitter: Arc::new(SimulatedSubmitter::new().timing_out_trades()),
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let step = agent.run_cycle(&RiskState::default()).await.unwrap();

    let CycleOutcome::Unresolved { execution } = &step.outcome else {
        panic!("expected unresolved, got {:?}", step.outcome);
    };
    assert_eq!(execution.status, ExecutionStatus::Pending);
    assert_eq!(execution.phase, TradePhase::Submitted);
    assert!(harness.submitter.submitted_settlements().await.is_empty());
    assert_eq!(step.state.current_exposure, dec!(1000));
    assert_eq!(step.state.total_trades, 0);
    assert_eq!(step.state.daily_loss, Decimal::ZERO);

    let reconciled = agent.tracker().release_exposure(&step.state, execution.position_size);
    assert_eq!(reconciled.current_exposure, Decimal::ZERO);
}

#[tokio::test]
async fn two_losing_cycles_trip_the_breaker_and_block_the_third() {
    // Each revert burns 75× the estimated gas: a loss of 150 against a
    // daily limit of 250.
    let harness = Harness {
        submitter: Arc::new(
            SimulatedSubmitter::new()
                .reverting_trades()
                .with_gas_used(SWAP_GAS_UNITS * 75),
        ),
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let first = agent.run_cycle(&RiskState::default()).await.unwrap();
    assert_eq!(first.state.daily_loss, dec!(-150));
    assert!(!first.state.circuit_breaker_active);

    let second = agent.run_cycle(&first.state).await.unwrap();
    assert_eq!(second.state.daily_loss, dec!(-300));
    assert!(second.state.circuit_breaker_active);

    let third = agent.run_cycle(&second.state).await.unwrap();
    let CycleOutcome::Rejected { stage, reasons, .. } = &third.outcome else {
        panic!("expected rejection, got {:?}", third.outcome);
    };
    assert_eq!(*stage, RejectionStage::Risk);
    assert!(!reasons.is_empty());
    assert_eq!(third.state, second.state);
    assert_eq!(harness.submitter.submitted_trades().await.len(), 2);
}

#[tokio::test]
async fn implausible_prices_skip_as_invalid_market_data() {
    let harness = Harness {
        cex: Some(dec!(0.0850)),
        dex: dec!(2.00),
        ..Harness::profitable()
    };
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut agent = harness.build(events);

    let state = RiskState::default();
    let step = agent.run_cycle(&state).await.unwrap();

    assert!(matches!(
        step.outcome,
        CycleOutcome::Skipped { reason: SkipReason::InvalidMarketData { .. } }
    ));
    assert_eq!(step.state, state);
    assert!(drain(&mut rx).is_empty());
    assert!(harness.submitter.submitted_trades().await.is_empty());
}

#[tokio::test]
async fn unreachable_exchange_skips_and_is_counted() {
    let harness = Harness {
        cex: None,
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let step = agent.run_cycle(&RiskState::default()).await.unwrap();

    assert!(matches!(
        step.outcome,
        CycleOutcome::Skipped { reason: SkipReason::DataUnavailable { .. } }
    ));
    assert_eq!(agent.recovery().total_errors(), 1);
}

#[tokio::test]
async fn thin_spread_is_skipped_before_the_gate() {
    let harness = Harness {
        cex: Some(dec!(3001)),
        advisor: Some(Arc::new(Advisor { should_execute: true, confidence: 99 })),
        ..Harness::profitable()
    };
    let mut agent = harness.build(EventBus::default());

    let step = agent.run_cycle(&RiskState::default()).await.unwrap();

    assert!(matches!(
        step.outcome,
        CycleOutcome::Skipped { reason: SkipReason::Unprofitable { recommendation: Recommendation::Skip, .. } }
    ));
}

#[tokio::test]
async fn advisory_rejection_is_recorded_and_state_untouched() {
    let harness = Harness {
        advisor: Some(Arc::new(Advisor { should_execute: false, confidence: 85 })),
        ..Harness::profitable()
    };
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut agent = harness.build(events);

    let state = RiskState::default();
    let step = agent.run_cycle(&state).await.unwrap();

    let CycleOutcome::Rejected { stage, reasons, .. } = &step.outcome else {
        panic!("expected rejection, got {:?}", step.outcome);
    };
    assert_eq!(*stage, RejectionStage::Advisory);
    assert!(reasons[0].contains("volatility elevated"));
    assert_eq!(step.state, state);
    assert!(harness.submitter.submitted_trades().await.is_empty());

    let names: Vec<_> = drain(&mut rx).iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["opportunity-detected", "trade-skipped"]);
}

#[tokio::test]
async fn exposure_ceiling_rejects_with_risk_warning() {
    let harness = Harness::profitable();
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut agent = harness.build(events);

    let state = RiskState {
        current_exposure: dec!(14500),
        ..RiskState::default()
    };
    let step = agent.run_cycle(&state).await.unwrap();

    assert!(matches!(
        step.outcome,
        CycleOutcome::Rejected { stage: RejectionStage::Risk, .. }
    ));
    let names: Vec<_> = drain(&mut rx).iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["opportunity-detected", "risk-warning", "trade-skipped"]);
}

#[tokio::test]
async fn event_sequence_and_timestamps_strictly_increase() {
    let harness = Harness::profitable();
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut agent = harness.build(events);

    let mut state = RiskState::default();
    for _ in 0..3 {
        state = agent.run_cycle(&state).await.unwrap().state;
    }

    let envelopes = drain(&mut rx);
    assert_eq!(envelopes.len(), 9);
    for pair in envelopes.windows(2) {
        assert!(pair[1].sequence > pair[0].sequence);
        assert!(pair[1].timestamp_ms > pair[0].timestamp_ms);
    }
}
