//! [`IgBroker`] wires the REST client into the guard's broker traits.

use crate::auth::{IgAuthConfig, IgCredentials};
use crate::client::{IgClient, IgClientConfig};
use crate::error::Result;
use async_trait::async_trait;
use position_guard_core::{
    CloseConfirmation, CloseInstruction, ClosedTrade, ClosedTradeSource, GuardConfig, MarketGate,
    MarketStatus, OrderGateway, PositionSource, RawPosition, Session, SessionProvider,
};

/// IG account seen through the guard's broker traits.
#[derive(Debug)]
pub struct IgBroker {
    client: IgClient,
    market_gate_epic: String,
}

impl IgBroker {
    pub fn new(client: IgClient, market_gate_epic: impl Into<String>) -> Self {
        Self {
            client,
            market_gate_epic: market_gate_epic.into(),
        }
    }

    /// Builds a broker from configuration, reading credentials from the
    /// environment variables it names.
    ///
    /// # Errors
    /// Returns error if a credential variable is unset or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let credentials = IgCredentials::from_env(&IgAuthConfig::from(&config.broker))?;
        let client = IgClient::new(IgClientConfig::from(&config.broker), credentials)?;
        Ok(Self::new(client, config.risk.market_gate_epic.clone()))
    }

    #[must_use]
    pub fn client(&self) -> &IgClient {
        &self.client
    }

    #[must_use]
    pub fn market_gate_epic(&self) -> &str {
        &self.market_gate_epic
    }
}

#[async_trait]
impl SessionProvider for IgBroker {
    async fn authenticate(&self) -> anyhow::Result<Session> {
        Ok(self.client.login().await?)
    }
}

#[async_trait]
impl MarketGate for IgBroker {
    async fn market_status(&self, session: &Session) -> anyhow::Result<MarketStatus> {
        Ok(self
            .client
            .market_status(session, &self.market_gate_epic)
            .await?)
    }
}

#[async_trait]
impl PositionSource for IgBroker {
    async fn open_positions(&self, session: &Session) -> anyhow::Result<Vec<RawPosition>> {
        Ok(self.client.open_positions(session).await?)
    }
}

#[async_trait]
impl OrderGateway for IgBroker {
    async fn close_position(
        &self,
        session: &Session,
        instruction: &CloseInstruction,
    ) -> anyhow::Result<CloseConfirmation> {
        Ok(self.client.close_position(session, instruction).await?)
    }
}

#[async_trait]
impl ClosedTradeSource for IgBroker {
    async fn closed_trades(&self, session: &Session, days: u32) -> anyhow::Result<Vec<ClosedTrade>> {
        Ok(self.client.closed_trades(session, days).await?)
    }
}
