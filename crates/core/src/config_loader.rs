use crate::config::GuardConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering built-in defaults, the TOML file at `path`
    /// (skipped when absent) and `GUARD_`-prefixed environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `GUARD_RISK__MARKET_GATE_EPIC`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed.
    pub fn load_from(path: &str) -> Result<GuardConfig> {
        let config: GuardConfig = Self::figment(path).extract()?;
        Ok(config)
    }

    #[must_use]
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(GuardConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("GUARD_").split("__"))
    }
}
