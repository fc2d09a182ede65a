use serde::{Deserialize, Serialize};

/// IG demo gateway base URL.
pub const IG_DEMO_URL: &str = "https://demo-api.ig.com/gateway/deal";

/// IG live gateway base URL.
pub const IG_LIVE_URL: &str = "https://api.ig.com/gateway/deal";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub broker: BrokerConfig,
    pub risk: RiskConfig,
    pub schedule: ScheduleConfig,
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerEnvironment {
    #[default]
    Demo,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub environment: BrokerEnvironment,
    /// Overrides the environment's gateway URL (used against mock servers).
    pub base_url: Option<String>,
    /// Names of the environment variables holding credentials.
    pub api_key_env: String,
    pub username_env: String,
    pub password_env: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            environment: BrokerEnvironment::Demo,
            base_url: None,
            api_key_env: "IG_API_KEY".to_string(),
            username_env: "IG_USERNAME".to_string(),
            password_env: "IG_PASSWORD".to_string(),
            requests_per_minute: 30,
            timeout_secs: 30,
        }
    }
}

impl BrokerConfig {
    #[must_use]
    pub fn resolved_base_url(&self) -> &str {
        match (&self.base_url, self.environment) {
            (Some(url), _) => url,
            (None, BrokerEnvironment::Demo) => IG_DEMO_URL,
            (None, BrokerEnvironment::Live) => IG_LIVE_URL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Epic whose market status gates the whole cycle.
    pub market_gate_epic: String,
    /// Instruments never flagged as averaging down.
    pub excluded_instruments: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            market_gate_epic: "IX.D.NASDAQ.IFE.IP".to_string(),
            excluded_instruments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub closed_trade_days: u32,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            closed_trade_days: 7,
        }
    }
}
