mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

pub const DATABASE_PATH_ENV: &str = "MESSAGES_DB_PATH";
pub const API_KEY_ENV: &str = "COMPLETION_API_KEY";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    let mut config = from_yaml(&config_str)?;
    config.apply_overrides(|key| env::var(key).ok());
    config.validate()?;

    Ok(config)
}

pub fn from_yaml(source: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(source)?)
}

impl Config {
    /// Replaces the database path and the API credential with values from `lookup`
    /// when it has them.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATABASE_PATH_ENV).filter(|p| !p.is_empty()) {
            debug!("Database path overridden by {}", DATABASE_PATH_ENV);
            self.server.database_path = path;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            debug!("Completion API key taken from {}", API_KEY_ENV);
            self.completion.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let completion = &self.completion;
        if completion.api_key.trim().is_empty() {
            return Err(Error::config(format!(
                "completion.api_key is empty (set it in the config file or via {API_KEY_ENV})"
            )));
        }
        if completion.model.trim().is_empty() {
            return Err(Error::config("completion.model is empty"));
        }
        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(Error::config(format!(
                "completion.temperature must be within 0.0..=2.0, got {}",
                completion.temperature
            )));
        }
        if completion.max_tokens == 0 {
            return Err(Error::config("completion.max_tokens must be positive"));
        }
        if completion.timeout_secs == 0 {
            return Err(Error::config("completion.timeout_secs must be positive"));
        }
        Ok(())
    }
}
