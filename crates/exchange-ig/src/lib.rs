//! IG broker integration for the position guard.
//!
//! This crate provides:
//! - REST client with rate limiting for the IG dealing gateway
//! - Session login using API key, identifier and password
//! - Wire types for positions, market snapshots, closes and transaction history
//! - [`IgBroker`], which implements the guard's broker traits
//!
//! # Example
//!
//! ```ignore
//! use position_guard_core::ConfigLoader;
//! use position_guard_ig::IgBroker;
//!
//! let config = ConfigLoader::load_from("config/Config.toml")?;
//! let broker = IgBroker::from_config(&config)?;
//! ```
//!
//! # Authentication
//!
//! Credentials are read from the environment variables named in the broker
//! configuration (by default):
//!
//! - `IG_API_KEY`: API key sent as `X-IG-API-KEY`
//! - `IG_USERNAME`: account identifier
//! - `IG_PASSWORD`: account password
//!
//! # API Endpoints
//!
//! - `POST /session` - Open a session (Version 2)
//! - `GET /markets/{epic}` - Market snapshot (Version 3)
//! - `GET /positions` - Open positions (Version 2)
//! - `POST /positions/otc` with `_method: DELETE` - Close a position (Version 1)
//! - `GET /history/transactions` - Closed deals (Version 2)

pub mod auth;
pub mod broker;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{IgAuthConfig, IgCredentials};
pub use broker::IgBroker;
pub use client::{IgClient, IgClientConfig};
pub use error::{IgError, Result};
pub use types::parse_ig_timestamp;
