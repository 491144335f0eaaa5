//! Runtime configuration for the checkpoint tool.

use std::str::FromStr;

use cairn_core::constants::NetworkType;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other} (expected text or json)")),
        }
    }
}

/// Settings fixed once at startup and threaded into every query.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Network whose checkpoint table is active.
    pub network: NetworkType,
    /// Log level filter string (e.g. "warn", "cairn_consensus=debug").
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::Mainnet,
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
