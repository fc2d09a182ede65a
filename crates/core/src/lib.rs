pub mod config;
pub mod config_loader;
pub mod history;
pub mod instruction;
pub mod position;
pub mod session;
pub mod traits;

pub use config::{
    BrokerConfig, BrokerEnvironment, GuardConfig, ReportingConfig, RiskConfig, ScheduleConfig,
    IG_DEMO_URL, IG_LIVE_URL,
};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use history::ClosedTrade;
pub use instruction::{CloseConfirmation, CloseInstruction, OrderType, TimeInForce};
pub use position::{Direction, MarketStatus, ParseDirectionError, Position, RawPosition};
pub use session::Session;
pub use traits::{ClosedTradeSource, MarketGate, OrderGateway, PositionSource, SessionProvider};
