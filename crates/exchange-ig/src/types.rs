//! IG wire types and their conversion into broker-agnostic records.

use chrono::{DateTime, NaiveDateTime, Utc};
use position_guard_core::{
    CloseInstruction, ClosedTrade, Direction, MarketStatus, OrderType, RawPosition, TimeInForce,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{IgError, Result};

/// Parses IG's UTC timestamps, which usually omit the offset
/// (`2024-05-02T13:01:00`), but accepts RFC 3339 too.
pub fn parse_ig_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| IgError::Serialization(format!("invalid timestamp {value:?}: {e}")))
}

// =============================================================================
// Positions
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPositionsResponse {
    #[serde(default)]
    pub positions: Vec<RawPositionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPositionEntry {
    pub position: RawPositionData,
    pub market: RawMarketData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPositionData {
    pub deal_id: String,
    pub direction: String,
    pub level: Decimal,
    pub size: Decimal,
    #[serde(rename = "createdDateUTC")]
    pub created_date_utc: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMarketData {
    pub instrument_name: String,
    pub bid: Option<Decimal>,
    pub offer: Option<Decimal>,
    pub market_status: MarketStatus,
}

impl RawPositionEntry {
    /// Missing quotes (seen on closed markets) fall back to the entry level,
    /// which marks the position flat.
    pub fn into_raw_position(self) -> Result<RawPosition> {
        let created_at = parse_ig_timestamp(&self.position.created_date_utc)?;
        let level = self.position.level;

        Ok(RawPosition {
            instrument_name: self.market.instrument_name,
            deal_id: self.position.deal_id,
            direction: self.position.direction,
            level,
            size: self.position.size,
            created_at,
            bid: self.market.bid.unwrap_or(level),
            offer: self.market.offer.unwrap_or(level),
            market_status: self.market.market_status,
        })
    }
}

// =============================================================================
// Markets
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMarketDetails {
    pub snapshot: RawMarketSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMarketSnapshot {
    pub market_status: MarketStatus,
}

// =============================================================================
// Closing
// =============================================================================

/// Body of `POST /positions/otc` sent with `_method: DELETE`.
///
/// Closing by deal id leaves the instrument and price fields null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClosePositionRequest<'a> {
    pub deal_id: &'a str,
    pub epic: Option<&'a str>,
    pub expiry: Option<&'a str>,
    pub direction: Direction,
    pub size: &'a str,
    pub level: Option<Decimal>,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub quote_id: Option<&'a str>,
}

impl<'a> From<&'a CloseInstruction> for ClosePositionRequest<'a> {
    fn from(instruction: &'a CloseInstruction) -> Self {
        Self {
            deal_id: &instruction.deal_id,
            epic: None,
            expiry: None,
            direction: instruction.direction,
            size: &instruction.size,
            level: None,
            order_type: instruction.order_type,
            time_in_force: instruction.time_in_force,
            quote_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DealReferenceResponse {
    pub deal_reference: Option<String>,
}

// =============================================================================
// Transaction history
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTransaction {
    pub date_utc: String,
    pub instrument_name: String,
    pub reference: String,
    pub profit_and_loss: String,
    pub open_level: Option<String>,
    pub close_level: Option<String>,
    pub size: Option<String>,
    pub currency: Option<String>,
}

/// IG reports levels and sizes as strings such as `"+1"` or `"-"`.
fn parse_optional_decimal(value: Option<&str>) -> Option<Decimal> {
    value
        .map(|s| s.trim().trim_start_matches('+'))
        .and_then(|s| Decimal::from_str(s).ok())
}

impl RawTransaction {
    pub fn into_closed_trade(self) -> Result<ClosedTrade> {
        Ok(ClosedTrade {
            closed_at: parse_ig_timestamp(&self.date_utc)?,
            open_level: parse_optional_decimal(self.open_level.as_deref()),
            close_level: parse_optional_decimal(self.close_level.as_deref()),
            size: parse_optional_decimal(self.size.as_deref()),
            instrument_name: self.instrument_name,
            reference: self.reference,
            profit_and_loss: self.profit_and_loss,
            currency: self.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_timestamp_without_offset() {
        let ts = parse_ig_timestamp("2024-05-02T13:01:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 2, 13, 1, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_with_fraction_and_offset() {
        let ts = parse_ig_timestamp("2024-05-02T13:01:00.250").unwrap();
        assert_eq!(ts.timestamp_millis() % 1000, 250);

        let ts = parse_ig_timestamp("2024-05-02T13:01:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 2, 13, 1, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_ig_timestamp("02/05/2024"),
            Err(IgError::Serialization(_))
        ));
    }

    #[test]
    fn test_position_entry_conversion() {
        let entry: RawPositionEntry = serde_json::from_value(serde_json::json!({
            "position": {
                "contractSize": 1.0,
                "createdDate": "2024/05/02 14:01:00:000",
                "createdDateUTC": "2024-05-02T13:01:00",
                "dealId": "DIAAAAPQ7ZV3ZAN",
                "dealReference": "RFQ1",
                "size": 1.5,
                "direction": "BUY",
                "level": 2301.2,
                "currency": "GBP",
                "controlledRisk": false
            },
            "market": {
                "instrumentName": "Spot Gold",
                "epic": "CS.D.CFDGOLD.CFDGC.IP",
                "bid": 2305.1,
                "offer": 2305.4,
                "marketStatus": "TRADEABLE"
            }
        }))
        .unwrap();

        let raw = entry.into_raw_position().unwrap();
        assert_eq!(raw.instrument_name, "Spot Gold");
        assert_eq!(raw.deal_id, "DIAAAAPQ7ZV3ZAN");
        assert_eq!(raw.direction, "BUY");
        assert_eq!(raw.level, dec!(2301.2));
        assert_eq!(raw.size, dec!(1.5));
        assert_eq!(raw.bid, dec!(2305.1));
        assert_eq!(raw.market_status, MarketStatus::Tradeable);
    }

    #[test]
    fn test_position_entry_without_quote_is_marked_flat() {
        let entry: RawPositionEntry = serde_json::from_value(serde_json::json!({
            "position": {
                "createdDateUTC": "2024-05-02T13:01:00",
                "dealId": "D1",
                "size": 1,
                "direction": "SELL",
                "level": 100
            },
            "market": {
                "instrumentName": "Oil",
                "bid": null,
                "offer": null,
                "marketStatus": "CLOSED"
            }
        }))
        .unwrap();

        let raw = entry.into_raw_position().unwrap();
        assert_eq!(raw.bid, dec!(100));
        assert_eq!(raw.offer, dec!(100));
        assert_eq!(raw.market_status, MarketStatus::Closed);
    }

    #[test]
    fn test_close_request_has_null_price_fields() {
        let instruction = CloseInstruction {
            deal_id: "D1".to_string(),
            direction: Direction::Short,
            size: "2".to_string(),
            order_type: OrderType::Market,
            time_in_force: TimeInForce::FillOrKill,
        };
        let body = serde_json::to_value(ClosePositionRequest::from(&instruction)).unwrap();

        assert_eq!(body["dealId"], "D1");
        assert_eq!(body["direction"], "SELL");
        assert_eq!(body["size"], "2");
        assert_eq!(body["orderType"], "MARKET");
        assert_eq!(body["timeInForce"], "FILL_OR_KILL");
        assert!(body["epic"].is_null());
        assert!(body["expiry"].is_null());
        assert!(body["level"].is_null());
        assert!(body["quoteId"].is_null());
        assert!(body.as_object().unwrap().contains_key("quoteId"));
    }

    #[test]
    fn test_transaction_conversion() {
        let raw: RawTransaction = serde_json::from_value(serde_json::json!({
            "date": "2024-05-01",
            "dateUtc": "2024-05-01T09:00:00",
            "openDateUtc": "2024-04-30T15:00:00",
            "instrumentName": "Spot Gold",
            "period": "-",
            "profitAndLoss": "£10.00",
            "transactionType": "DEAL",
            "reference": "ABC123",
            "openLevel": "2300",
            "closeLevel": "2310",
            "size": "+1",
            "currency": "£",
            "cashTransaction": false
        }))
        .unwrap();

        let trade = raw.into_closed_trade().unwrap();
        assert_eq!(trade.instrument_name, "Spot Gold");
        assert_eq!(trade.open_level, Some(dec!(2300)));
        assert_eq!(trade.close_level, Some(dec!(2310)));
        assert_eq!(trade.size, Some(dec!(1)));
        assert_eq!(trade.profit_and_loss, "£10.00");
    }

    #[test]
    fn test_optional_decimal_handles_placeholders() {
        assert_eq!(parse_optional_decimal(Some("-")), None);
        assert_eq!(parse_optional_decimal(Some("-2")), Some(dec!(-2)));
        assert_eq!(parse_optional_decimal(None), None);
    }
}
