//! Single-cycle command.

use anyhow::Result;
use position_guard_core::GuardConfig;
use position_guard_risk::{CycleOutcome, CycleReport};

use super::build_orchestrator;

/// Runs one cycle and prints what it did.
///
/// # Errors
/// Returns an error if the cycle failed, including when any close failed.
pub async fn run_once(config: &GuardConfig) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let outcome = orchestrator.run_cycle().await?;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

/// One-paragraph summary of a cycle outcome.
pub(crate) fn describe_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::MarketRestricted { status } => {
            format!("Market gate reported {status}; no positions evaluated")
        }
        CycleOutcome::Completed(report) => describe_report(report),
    }
}

fn describe_report(report: &CycleReport) -> String {
    let mut out = format!(
        "Evaluated {} position(s) across {} instrument(s), unrealized P/L {}\n",
        report.positions_seen, report.instruments_seen, report.total_profit_loss
    );

    if report.candidates.is_empty() {
        out.push_str("No averaging-down positions found");
        return out;
    }

    out.push_str(&format!(
        "Flagged {} position(s), closed {}, skipped {} (market not tradeable)",
        report.candidates.len(),
        report.execution.closed.len(),
        report.skipped_non_tradeable()
    ));

    for candidate in &report.candidates {
        let position = &candidate.position;
        out.push_str(&format!(
            "\n  {} {} {} @ {} (previous {}, P/L {})",
            position.instrument_name,
            position.deal_id,
            position.direction,
            position.level,
            candidate.reason.previous_level,
            position.profit_loss
        ));
    }

    out
}
