//! Close-instruction construction.

use position_guard_core::CloseInstruction;
use tracing::debug;

use crate::detector::ClosureCandidate;

/// Builds one market, fill-or-kill close per candidate whose market is tradeable.
///
/// Candidates on non-tradeable markets are dropped for this cycle; they are
/// still open and will be flagged again next cycle. Order is preserved.
#[must_use]
pub fn build_close_instructions(candidates: &[ClosureCandidate]) -> Vec<CloseInstruction> {
    candidates
        .iter()
        .filter(|candidate| {
            let tradeable = candidate.position.market_status.is_tradeable();
            if !tradeable {
                debug!(
                    deal_id = %candidate.position.deal_id,
                    instrument = %candidate.position.instrument_name,
                    market_status = %candidate.position.market_status,
                    "Skipping closure on non-tradeable market"
                );
            }
            tradeable
        })
        .map(|candidate| CloseInstruction::market_close(&candidate.position))
        .collect()
}
