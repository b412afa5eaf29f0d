//! Network backends for the monitor.
//!
//! Provides the `FeedClient` and `ChatTransport` capabilities with one
//! reqwest-backed implementation each (GraphQL indexers, Telegram Bot API)
//! plus scripted doubles in `mock` for tests.

pub mod graphql;
pub mod mock;
pub mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FeedError, TransportError};

/// Per-request timeout shared by feed queries and chat sends.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A GraphQL endpoint that answers one document at a time.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Run `document` with `variables`, returning the `data` object.
    async fn query(&self, document: &str, variables: Value) -> Result<Value, FeedError>;
}

/// One message as handed to the chat provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub silent: bool,
}

/// How the chat provider answered a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    Delivered,
    /// The provider asked us to back off, optionally for a given duration.
    RateLimited { retry_after: Option<Duration> },
    Rejected { status: u16, body: String },
}

/// The messaging channel alerts are delivered to.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Make exactly one attempt to post `message`.
    async fn post(&self, message: &OutboundMessage) -> Result<SendStatus, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::{MockFeed, MockTransport};

    #[test]
    fn mocks_implement_the_capabilities() {
        let feed = MockFeed::new();
        let transport = MockTransport::new();
        let _: &dyn FeedClient = &feed;
        let _: &dyn ChatTransport = &transport;
    }
}
