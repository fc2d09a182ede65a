//! Position snapshot normalization.
//!
//! Turns the raw open-position feed into per-instrument series ordered by
//! creation time, computing each position's unrealized profit/loss once.

use std::collections::BTreeMap;

use position_guard_core::{Direction, Position, RawPosition};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::{GuardError, Result};

/// Open positions of one instrument, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentGroup {
    pub instrument_name: String,
    pub positions: Vec<Position>,
}

impl InstrumentGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One cycle's view of the account, keyed by instrument name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    groups: BTreeMap<String, InstrumentGroup>,
    total_profit_loss: Decimal,
}

impl Snapshot {
    /// Groups in instrument-name order.
    pub fn groups(&self) -> impl Iterator<Item = &InstrumentGroup> {
        self.groups.values()
    }

    #[must_use]
    pub fn group(&self, instrument_name: &str) -> Option<&InstrumentGroup> {
        self.groups.get(instrument_name)
    }

    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn position_count(&self) -> usize {
        self.groups.values().map(InstrumentGroup::len).sum()
    }

    /// Sum of every position's profit/loss.
    #[must_use]
    pub fn total_profit_loss(&self) -> Decimal {
        self.total_profit_loss
    }
}

/// Unrealized profit/loss of a position at the current quote, to 2 dp.
///
/// Longs are marked against the bid, shorts against the offer. `None` if the
/// result does not fit in a [`Decimal`].
#[must_use]
pub fn profit_loss(
    direction: Direction,
    level: Decimal,
    size: Decimal,
    bid: Decimal,
    offer: Decimal,
) -> Option<Decimal> {
    let move_in_favour = match direction {
        Direction::Long => bid.checked_sub(level)?,
        Direction::Short => level.checked_sub(offer)?,
    };
    let raw = move_in_favour.checked_mul(size)?;
    Some(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn normalize_position(raw: RawPosition) -> Result<Position> {
    let direction: Direction = raw.direction.parse().map_err(|e| {
        GuardError::snapshot(format!("deal {} ({}): {e}", raw.deal_id, raw.instrument_name))
    })?;

    if raw.size <= Decimal::ZERO {
        return Err(GuardError::snapshot(format!(
            "deal {} ({}): non-positive size {}",
            raw.deal_id, raw.instrument_name, raw.size
        )));
    }

    let profit_loss = profit_loss(direction, raw.level, raw.size, raw.bid, raw.offer)
        .ok_or_else(|| {
            GuardError::snapshot(format!(
                "deal {} ({}): profit/loss out of range",
                raw.deal_id, raw.instrument_name
            ))
        })?;

    Ok(Position {
        instrument_name: raw.instrument_name,
        deal_id: raw.deal_id,
        direction,
        level: raw.level,
        size: raw.size,
        created_at: raw.created_at,
        bid: raw.bid,
        offer: raw.offer,
        market_status: raw.market_status,
        profit_loss,
    })
}

/// Builds the cycle snapshot from the raw feed.
///
/// Positions keep feed order when their creation times are equal.
///
/// # Errors
/// Returns [`GuardError::Snapshot`] if any record has an unknown direction, a
/// non-positive size, or a profit/loss out of range. A partial snapshot is
/// never returned.
pub fn normalize_snapshot(raw: Vec<RawPosition>) -> Result<Snapshot> {
    let mut groups: BTreeMap<String, InstrumentGroup> = BTreeMap::new();
    let mut total_profit_loss = Decimal::ZERO;

    for record in raw {
        let position = normalize_position(record)?;
        total_profit_loss = total_profit_loss
            .checked_add(position.profit_loss)
            .ok_or_else(|| GuardError::snapshot("total profit/loss out of range"))?;
        groups
            .entry(position.instrument_name.clone())
            .or_insert_with(|| InstrumentGroup {
                instrument_name: position.instrument_name.clone(),
                positions: Vec::new(),
            })
            .positions
            .push(position);
    }

    for group in groups.values_mut() {
        // stable: equal timestamps stay in feed order
        group.positions.sort_by_key(|p| p.created_at);
        debug!(
            instrument = %group.instrument_name,
            positions = group.len(),
            "Normalized instrument group"
        );
    }

    Ok(Snapshot {
        groups,
        total_profit_loss,
    })
}
