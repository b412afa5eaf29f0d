//! Rendering of feed items into Telegram HTML messages.

pub mod format;
pub mod templates;

use chrono::Utc;

/// Inputs every template needs besides the item itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Block explorer base used for transaction links.
    pub explorer_url: String,
    /// Reference "now" for relative deadlines.
    pub now_secs: i64,
}

impl RenderContext {
    pub fn new(explorer_url: impl Into<String>, now_secs: i64) -> Self {
        RenderContext {
            explorer_url: explorer_url.into(),
            now_secs,
        }
    }

    /// Context pinned to the current wall-clock second.
    pub fn now(explorer_url: impl Into<String>) -> Self {
        Self::new(explorer_url, Utc::now().timestamp())
    }
}
