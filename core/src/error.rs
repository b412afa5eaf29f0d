//! Error types for each boundary of the monitor.
//!
//! None of these terminate the poll loop; the orchestrator logs them and
//! contains the damage to a single category or a single alert.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures reading or writing the watermark file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("watermark I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("watermark serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of a single feed query.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed transport error: {0}")]
    Transport(String),

    #[error("feed query timed out after {0:?}")]
    Timeout(Duration),

    #[error("feed returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("feed returned GraphQL errors: {0}")]
    GraphQl(String),

    #[error("unexpected feed response shape: {0}")]
    Schema(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(value: serde_json::Error) -> Self {
        Self::Schema(value.to_string())
    }
}

/// Failures of a single call to the messaging channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat transport network error: {0}")]
    Network(String),

    #[error("chat request timed out after {0:?}")]
    Timeout(Duration),

    #[error("cannot read chat response: {0}")]
    Decode(String),
}

// The request URL embeds the bot token, so it is stripped from the message.
impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.without_url().to_string())
    }
}

/// Terminal outcome of a `DeliveryEngine::send` that did not deliver.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("gave up after {attempts} failed attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("rate-limit wait of {waited:?} would exceed the {cap:?} cap")]
    RateLimitBudgetExceeded { waited: Duration, cap: Duration },
}

/// Invalid or missing configuration. The only error that stops the process,
/// and only before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid {key}: \"{value}\" ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot build HTTP client: {0}")]
    Client(String),
}
