use crate::position::{Direction, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
}

/// Execute fully and immediately, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    FillOrKill,
}

/// Broker-agnostic instruction to flatten one open position.
///
/// A plain value: it carries no reference back to the position it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseInstruction {
    pub deal_id: String,
    pub direction: Direction,
    pub size: String,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
}

impl CloseInstruction {
    /// Market, fill-or-kill order on the opposite side for the full size.
    #[must_use]
    pub fn market_close(position: &Position) -> Self {
        Self {
            deal_id: position.deal_id.clone(),
            direction: position.direction.opposite(),
            size: position.size.normalize().to_string(),
            order_type: OrderType::Market,
            time_in_force: TimeInForce::FillOrKill,
        }
    }
}

/// Acknowledgement returned by the order gateway for an accepted close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseConfirmation {
    pub deal_id: String,
    pub deal_reference: Option<String>,
}
