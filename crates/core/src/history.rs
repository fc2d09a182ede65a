use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A deal closed at the broker, used for reporting only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub instrument_name: String,
    pub reference: String,
    pub closed_at: DateTime<Utc>,
    pub open_level: Option<Decimal>,
    pub close_level: Option<Decimal>,
    pub size: Option<Decimal>,
    /// As reported by the broker, currency symbol included (e.g. `£-12.40`).
    pub profit_and_loss: String,
    pub currency: Option<String>,
}
