//! IG REST API client with rate limiting.
//!
//! Provides typed access to the handful of IG dealing endpoints the guard
//! needs, with outbound requests throttled by the governor crate.
//!
//! # Example
//!
//! ```ignore
//! use position_guard_core::BrokerConfig;
//! use position_guard_ig::{IgClient, IgClientConfig, IgCredentials};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = IgCredentials::new("api-key", "trader", "password");
//!     let config = IgClientConfig::from(&BrokerConfig::default());
//!     let client = IgClient::new(config, credentials)?;
//!
//!     let session = client.login().await?;
//!     let positions = client.open_positions(&session).await?;
//!     println!("{} open positions", positions.len());
//!
//!     Ok(())
//! }
//! ```

use crate::auth::IgCredentials;
use crate::error::{IgError, Result};
use crate::types::{
    ClosePositionRequest, DealReferenceResponse, RawMarketDetails, RawPositionsResponse,
    RawTransactionsResponse,
};
use chrono::{Duration, Utc};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use position_guard_core::{
    BrokerConfig, CloseConfirmation, CloseInstruction, ClosedTrade, MarketStatus, RawPosition,
    Session,
};
use reqwest::{Client, RequestBuilder};
use std::num::NonZeroU32;
use std::sync::Arc;

const CST_HEADER: &str = "CST";
const SECURITY_TOKEN_HEADER: &str = "X-SECURITY-TOKEN";
const API_KEY_HEADER: &str = "X-IG-API-KEY";

const HISTORY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the IG client.
#[derive(Debug, Clone)]
pub struct IgClientConfig {
    /// Gateway base URL, e.g. `https://demo-api.ig.com/gateway/deal`.
    pub base_url: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Fallback when the configured rate is zero.
const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = nonzero!(30u32);

impl From<&BrokerConfig> for IgClientConfig {
    fn from(broker: &BrokerConfig) -> Self {
        Self {
            base_url: broker.resolved_base_url().to_string(),
            requests_per_minute: NonZeroU32::new(broker.requests_per_minute)
                .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE),
            timeout_secs: broker.timeout_secs,
        }
    }
}

// =============================================================================
// IgClient
// =============================================================================

/// IG REST API client.
///
/// Every call except [`IgClient::login`] takes the [`Session`] returned by login.
pub struct IgClient {
    config: IgClientConfig,

    http: Client,

    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,

    credentials: IgCredentials,
}

impl std::fmt::Debug for IgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl IgClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: IgClientConfig, credentials: IgCredentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IgError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            credentials,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Validates an epic so it can be used as a URL path segment.
    ///
    /// Epics look like `IX.D.NASDAQ.IFE.IP`: alphanumerics, dots, hyphens and
    /// underscores.
    fn validate_epic(epic: &str) -> Result<&str> {
        if epic.is_empty() {
            return Err(IgError::InvalidIdentifier("epic cannot be empty".to_string()));
        }

        if epic.contains("..") {
            return Err(IgError::InvalidIdentifier(format!(
                "epic contains forbidden sequence: {epic}"
            )));
        }

        if !epic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
        {
            return Err(IgError::InvalidIdentifier(format!(
                "epic must contain only alphanumeric, dot, hyphen, or underscore: {epic}"
            )));
        }

        if epic.len() > 64 {
            return Err(IgError::InvalidIdentifier(format!(
                "epic exceeds maximum length of 64: {}",
                epic.len()
            )));
        }

        Ok(epic)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attaches API key, session tokens and endpoint version.
    fn authed(&self, request: RequestBuilder, session: &Session, version: &str) -> RequestBuilder {
        request
            .header("Accept", "application/json")
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header(CST_HEADER, session.client_token())
            .header(SECURITY_TOKEN_HEADER, session.security_token())
            .header("Version", version)
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::check_status(response).await?;
        let body = response.json::<T>().await?;
        Ok(body)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(IgError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IgError::api(status.as_u16(), text));
        }

        Ok(response)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Opens a trading session.
    ///
    /// # Errors
    /// Returns [`IgError::Authentication`] if the login is rejected and
    /// [`IgError::MissingHeader`] if either session token is absent.
    pub async fn login(&self) -> Result<Session> {
        self.rate_limiter.until_ready().await;

        let url = self.url("/session");
        tracing::debug!(identifier = %self.credentials.identifier(), "POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header("Version", "2")
            .json(&self.credentials.login_request())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IgError::Authentication(format!(
                "login rejected with status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| IgError::missing_header(name))
        };

        let client_token = header(CST_HEADER)?;
        let security_token = header(SECURITY_TOKEN_HEADER)?;

        tracing::info!("IG session opened");
        Ok(Session::new(client_token, security_token))
    }

    // =========================================================================
    // Markets
    // =========================================================================

    /// Gets the trading status of a market.
    ///
    /// # Errors
    /// Returns error if the epic is invalid or the API call fails.
    pub async fn market_status(&self, session: &Session, epic: &str) -> Result<MarketStatus> {
        let epic = Self::validate_epic(epic)?;
        self.rate_limiter.until_ready().await;

        let url = self.url(&format!("/markets/{epic}"));
        tracing::debug!("GET {}", url);

        let response = self
            .authed(self.http.get(&url), session, "3")
            .send()
            .await?;

        let details: RawMarketDetails = Self::handle_response(response).await?;
        Ok(details.snapshot.market_status)
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Gets all open positions.
    ///
    /// # Errors
    /// Returns error if the API call fails or a record cannot be read.
    pub async fn open_positions(&self, session: &Session) -> Result<Vec<RawPosition>> {
        self.rate_limiter.until_ready().await;

        let url = self.url("/positions");
        tracing::debug!("GET {}", url);

        let response = self
            .authed(self.http.get(&url), session, "2")
            .send()
            .await?;

        let body: RawPositionsResponse = Self::handle_response(response).await?;
        body.positions
            .into_iter()
            .map(|entry| entry.into_raw_position())
            .collect()
    }

    /// Closes an open position by deal id.
    ///
    /// IG takes closes as a `POST` carrying an `_method: DELETE` override.
    ///
    /// # Errors
    /// Returns error if the gateway does not accept the close.
    pub async fn close_position(
        &self,
        session: &Session,
        instruction: &CloseInstruction,
    ) -> Result<CloseConfirmation> {
        self.rate_limiter.until_ready().await;

        let url = self.url("/positions/otc");
        let body = ClosePositionRequest::from(instruction);
        tracing::debug!(deal_id = %instruction.deal_id, "POST {} (_method=DELETE)", url);

        let response = self
            .authed(self.http.post(&url), session, "1")
            .header("Content-Type", "application/json")
            .header("_method", "DELETE")
            .json(&body)
            .send()
            .await?;

        let body: DealReferenceResponse = Self::handle_response(response).await?;

        Ok(CloseConfirmation {
            deal_id: instruction.deal_id.clone(),
            deal_reference: body.deal_reference,
        })
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Gets deals closed within the last `days` days.
    ///
    /// # Errors
    /// Returns error if the API call fails or a record cannot be read.
    pub async fn closed_trades(&self, session: &Session, days: u32) -> Result<Vec<ClosedTrade>> {
        self.rate_limiter.until_ready().await;

        let to = Utc::now();
        let from = to - Duration::days(i64::from(days));
        let url = self.url("/history/transactions");
        tracing::debug!(days, "GET {}", url);

        let response = self
            .authed(self.http.get(&url), session, "2")
            .query(&[
                ("type", "ALL_DEAL".to_string()),
                ("from", from.format(HISTORY_TIME_FORMAT).to_string()),
                ("to", to.format(HISTORY_TIME_FORMAT).to_string()),
            ])
            .send()
            .await?;

        let body: RawTransactionsResponse = Self::handle_response(response).await?;
        body.transactions
            .into_iter()
            .map(|t| t.into_closed_trade())
            .collect()
    }
}
