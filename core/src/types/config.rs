use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the watermark set is initialized when no state file exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// Every cursor starts at the current epoch second: history is skipped.
    Now,
    /// Every cursor starts at "0": the full history is replayed by catch-up.
    Genesis,
}

impl InitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitMode::Now => "now",
            InitMode::Genesis => "genesis",
        }
    }
}

impl FromStr for InitMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(InitMode::Now),
            "genesis" => Ok(InitMode::Genesis),
            _ => Err(()),
        }
    }
}

/// Whether alerts observed during catch-up reach the messaging channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpPolicy {
    /// Log and tally historical alerts; commit every candidate.
    LogOnly,
    /// Deliver historical alerts through the gated steady-state path.
    Deliver,
}

impl CatchUpPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatchUpPolicy::LogOnly => "log_only",
            CatchUpPolicy::Deliver => "deliver",
        }
    }
}

impl FromStr for CatchUpPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log_only" => Ok(CatchUpPolicy::LogOnly),
            "deliver" => Ok(CatchUpPolicy::Deliver),
            _ => Err(()),
        }
    }
}

/// Monitor settings, read from an optional YAML file and the environment.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_url: String,
    pub juiceswap_graphql_url: String,
    pub juicedollar_graphql_url: String,
    pub poll_interval_ms: u64,
    pub citrea_explorer_url: String,
    pub watermark_path: PathBuf,
    pub init_mode: InitMode,
    pub catch_up_policy: CatchUpPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        crate::data::settings::default_settings()
    }
}

// Keeps the bot token out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("juiceswap_graphql_url", &self.juiceswap_graphql_url)
            .field("juicedollar_graphql_url", &self.juicedollar_graphql_url)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("citrea_explorer_url", &self.citrea_explorer_url)
            .field("watermark_path", &self.watermark_path)
            .field("init_mode", &self.init_mode)
            .field("catch_up_policy", &self.catch_up_policy)
            .finish()
    }
}
