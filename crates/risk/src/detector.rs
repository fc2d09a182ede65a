//! Averaging-down detection.
//!
//! A position is flagged when its entry is no better than the entry of the
//! position opened immediately before it on the same instrument, judged from
//! the position's own side. Equal entries count as adverse.

use std::collections::HashSet;

use position_guard_core::{Direction, Position};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::normalizer::Snapshot;

/// Why a position was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionReason {
    /// Entry level of the immediately preceding position.
    pub previous_level: Decimal,
    /// Signed entry improvement over the previous position: `current - previous`
    /// for a long, `previous - current` for a short. Always `<= 0` on a candidate.
    pub delta: Decimal,
}

/// A flagged position awaiting closure.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureCandidate {
    pub position: Position,
    pub reason: DetectionReason,
}

/// Entry improvement of `current_level` over `previous_level` for `direction`.
///
/// Positive when the new entry is higher for a long or lower for a short.
/// Saturates at the [`Decimal`] bounds, which keeps the sign.
#[must_use]
pub fn entry_delta(direction: Direction, previous_level: Decimal, current_level: Decimal) -> Decimal {
    match direction {
        Direction::Long => current_level.saturating_sub(previous_level),
        Direction::Short => previous_level.saturating_sub(current_level),
    }
}

#[derive(Debug, Clone, Default)]
pub struct AveragingDownDetector {
    excluded_instruments: HashSet<String>,
}

impl AveragingDownDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instruments in `excluded` are never flagged.
    #[must_use]
    pub fn with_exclusions<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_instruments: excluded.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_excluded(&self, instrument_name: &str) -> bool {
        self.excluded_instruments.contains(instrument_name)
    }

    /// Flags adverse re-entries across the snapshot.
    ///
    /// Candidates come out instrument by instrument in snapshot order, each
    /// instrument's candidates in chronological order.
    #[must_use]
    pub fn detect(&self, snapshot: &Snapshot) -> Vec<ClosureCandidate> {
        let mut candidates = Vec::new();

        for group in snapshot.groups() {
            if group.len() < 2 {
                continue;
            }
            if self.is_excluded(&group.instrument_name) {
                debug!(instrument = %group.instrument_name, "Instrument excluded from averaging-down check");
                continue;
            }

            for pair in group.positions.windows(2) {
                let (previous, current) = (&pair[0], &pair[1]);
                let delta = entry_delta(current.direction, previous.level, current.level);

                if delta <= Decimal::ZERO {
                    info!(
                        instrument = %current.instrument_name,
                        deal_id = %current.deal_id,
                        direction = %current.direction,
                        previous_level = %previous.level,
                        level = %current.level,
                        %delta,
                        profit_loss = %current.profit_loss,
                        "Averaging down detected"
                    );
                    candidates.push(ClosureCandidate {
                        position: current.clone(),
                        reason: DetectionReason {
                            previous_level: previous.level,
                            delta,
                        },
                    });
                }
            }
        }

        candidates
    }
}
