//! CLI commands for the position guard.

pub mod closed_trades;
pub mod daemon;
pub mod run_once;

pub use closed_trades::{run_closed_trades, ClosedTradesArgs};
pub use daemon::{run_daemon, DaemonArgs};
pub use run_once::run_once;

use std::sync::Arc;

use anyhow::{Context, Result};
use position_guard_core::GuardConfig;
use position_guard_ig::IgBroker;
use position_guard_risk::{AveragingDownDetector, CycleOrchestrator};

/// Builds an orchestrator wired to the configured IG account.
pub(crate) fn build_orchestrator(config: &GuardConfig) -> Result<CycleOrchestrator> {
    let broker = Arc::new(IgBroker::from_config(config).context("failed to configure IG broker")?);
    let detector =
        AveragingDownDetector::with_exclusions(config.risk.excluded_instruments.iter().cloned());

    tracing::info!(
        base_url = %broker.client().base_url(),
        market_gate_epic = %broker.market_gate_epic(),
        excluded_instruments = config.risk.excluded_instruments.len(),
        "Position guard configured"
    );

    Ok(CycleOrchestrator::from_broker(broker, detector))
}
