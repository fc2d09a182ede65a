//! Closed-trade grouping for reporting.

use std::collections::BTreeMap;

use position_guard_core::{ClosedTrade, ClosedTradeSource, SessionProvider};
use tracing::info;

use crate::error::{GuardError, Result};

/// Groups closed trades by instrument name, keeping feed order within each.
#[must_use]
pub fn group_closed_trades(trades: Vec<ClosedTrade>) -> BTreeMap<String, Vec<ClosedTrade>> {
    let mut grouped: BTreeMap<String, Vec<ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        grouped
            .entry(trade.instrument_name.clone())
            .or_default()
            .push(trade);
    }
    grouped
}

/// Fetches trades closed in the last `days` days, grouped by instrument.
///
/// # Errors
/// Returns [`GuardError::Authentication`] if no session can be opened and
/// [`GuardError::History`] if the history lookup fails.
pub async fn closed_trade_report(
    sessions: &dyn SessionProvider,
    source: &dyn ClosedTradeSource,
    days: u32,
) -> Result<BTreeMap<String, Vec<ClosedTrade>>> {
    let session = sessions
        .authenticate()
        .await
        .map_err(|e| GuardError::Authentication(format!("{e:#}")))?;

    let trades = source
        .closed_trades(&session, days)
        .await
        .map_err(|e| GuardError::History(format!("{e:#}")))?;

    info!(days, trades = trades.len(), "Fetched closed trades");
    Ok(group_closed_trades(trades))
}
