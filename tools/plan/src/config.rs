//! Configuration for the plan tool.

use anyhow::{Context, Result};
use rollgate_model::TEMPLATE_HASH_LABEL_KEY;

/// Plan tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Overrides the snapshot's initial delay, in seconds.
    pub initial_delay_seconds: Option<i32>,

    /// Overrides the snapshot's takeover wait, in seconds.
    pub wait_takeover_seconds: Option<i32>,

    /// Label holding each group's template fingerprint.
    pub revision_label_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("ROLLGATE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let parse_secs = |key: &str| -> Result<Option<i32>> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<i32>()
                        .with_context(|| format!("{key} must be an integer, got {raw:?}"))
                })
                .transpose()
        };
        let initial_delay_seconds = parse_secs("ROLLGATE_INITIAL_DELAY_SECONDS")?;
        let wait_takeover_seconds = parse_secs("ROLLGATE_WAIT_TAKEOVER_SECONDS")?;

        let revision_label_key = lookup("ROLLGATE_REVISION_LABEL_KEY")
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| TEMPLATE_HASH_LABEL_KEY.to_string());

        Ok(Self {
            log_level,
            initial_delay_seconds,
            wait_takeover_seconds,
            revision_label_key,
        })
    }
}
