use crate::history::ClosedTrade;
use crate::instruction::{CloseConfirmation, CloseInstruction};
use crate::position::{MarketStatus, RawPosition};
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn authenticate(&self) -> Result<Session>;
}

/// Reports whether the reference market is open for trading.
#[async_trait]
pub trait MarketGate: Send + Sync {
    async fn market_status(&self, session: &Session) -> Result<MarketStatus>;
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn open_positions(&self, session: &Session) -> Result<Vec<RawPosition>>;
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn close_position(
        &self,
        session: &Session,
        instruction: &CloseInstruction,
    ) -> Result<CloseConfirmation>;
}

#[async_trait]
pub trait ClosedTradeSource: Send + Sync {
    async fn closed_trades(&self, session: &Session, days: u32) -> Result<Vec<ClosedTrade>>;
}
