use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Side of an open position.
///
/// Serialized with the broker's order vocabulary (`BUY`/`SELL`) so the same
/// value can be sent back on a close instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "BUY")]
    Long,
    #[serde(rename = "SELL")]
    Short,
}

impl Direction {
    /// The side that flattens a position opened on `self`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    #[must_use]
    pub const fn as_broker_str(self) -> &'static str {
        match self {
            Self::Long => "BUY",
            Self::Short => "SELL",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_broker_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown position direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Self::Long),
            "SELL" => Ok(Self::Short),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Trading state of the market a position lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Tradeable,
    EditsOnly,
    Closed,
    Offline,
    OnAuction,
    OnAuctionNoEdits,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl MarketStatus {
    /// New orders, including closing orders, are accepted.
    #[must_use]
    pub fn is_tradeable(self) -> bool {
        self == Self::Tradeable
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tradeable => "TRADEABLE",
            Self::EditsOnly => "EDITS_ONLY",
            Self::Closed => "CLOSED",
            Self::Offline => "OFFLINE",
            Self::OnAuction => "ON_AUCTION",
            Self::OnAuctionNoEdits => "ON_AUCTION_NO_EDITS",
            Self::Suspended => "SUSPENDED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// An open position exactly as the position source reported it.
///
/// `direction` is left as the broker's string so that a malformed feed is
/// caught when the snapshot is normalized rather than at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPosition {
    pub instrument_name: String,
    pub deal_id: String,
    pub direction: String,
    pub level: Decimal,
    pub size: Decimal,
    pub created_at: DateTime<Utc>,
    pub bid: Decimal,
    pub offer: Decimal,
    pub market_status: MarketStatus,
}

/// A normalized open position with its unrealized profit/loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument_name: String,
    pub deal_id: String,
    pub direction: Direction,
    pub level: Decimal,
    pub size: Decimal,
    pub created_at: DateTime<Utc>,
    pub bid: Decimal,
    pub offer: Decimal,
    pub market_status: MarketStatus,
    /// Signed, rounded to 2 decimal places.
    pub profit_loss: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_broker_vocabulary() {
        assert_eq!("BUY".parse::<Direction>(), Ok(Direction::Long));
        assert_eq!("SELL".parse::<Direction>(), Ok(Direction::Short));
        let err = "HOLD".parse::<Direction>().unwrap_err();
        assert!(err.to_string().contains("HOLD"));
    }

    #[test]
    fn opposite_flips_side() {
        assert_eq!(Direction::Long.opposite(), Direction::Short);
        assert_eq!(Direction::Short.opposite(), Direction::Long);
    }

    #[test]
    fn direction_serializes_as_buy_sell() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Direction::Short).unwrap(), "\"SELL\"");
    }

    #[test]
    fn market_status_falls_back_to_unknown() {
        let status: MarketStatus = serde_json::from_str("\"EDITS_ONLY\"").unwrap();
        assert_eq!(status, MarketStatus::EditsOnly);

        let status: MarketStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(status, MarketStatus::Unknown);
        assert!(!status.is_tradeable());
    }
}
