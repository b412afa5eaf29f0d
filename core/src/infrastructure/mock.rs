//! Scripted doubles for the network capabilities and for whole pollers.
//!
//! Each double records what it was asked and answers from a queue, falling
//! back to a benign default (empty page, delivered, empty poll) when the
//! queue runs dry, so orchestration tests only script what they care about.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{ChatTransport, FeedClient, OutboundMessage, SendStatus};
use crate::error::{FeedError, TransportError};
use crate::feed::queries::QuerySpec;
use crate::feed::SourcePoller;
use crate::render::RenderContext;
use crate::snapshot::watermark::WatermarkSet;
use crate::types::alert::PollResult;
use crate::types::category::{EventCategory, Feed};

// ---------------------------------------------------------------------------
// MockFeed
// ---------------------------------------------------------------------------

enum FeedReply {
    Items(Vec<Value>),
    Fail(String),
    Hang,
}

/// A `FeedClient` answering by query name.
#[derive(Default)]
pub struct MockFeed {
    replies: Mutex<HashMap<&'static str, VecDeque<FeedReply>>>,
    repeated: Mutex<HashMap<&'static str, Vec<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one page of raw items for the next call of `spec`.
    pub fn push_items(&self, spec: &QuerySpec, items: Vec<Value>) {
        self.push(spec, FeedReply::Items(items));
    }

    /// Queue a transport failure for the next call of `spec`.
    pub fn push_failure(&self, spec: &QuerySpec, message: &str) {
        self.push(spec, FeedReply::Fail(message.to_string()));
    }

    /// Make the next call of `spec` never answer.
    pub fn push_hang(&self, spec: &QuerySpec) {
        self.push(spec, FeedReply::Hang);
    }

    /// Answer `spec` with `items` whenever its queue is empty, ignoring the
    /// watermark, like an indexer that keeps serving the same page.
    pub fn repeat_items(&self, spec: &QuerySpec, items: Vec<Value>) {
        if let Ok(mut repeated) = self.repeated.lock() {
            repeated.insert(spec.name, items);
        }
    }

    fn push(&self, spec: &QuerySpec, reply: FeedReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(spec.name).or_default().push_back(reply);
        }
    }

    /// `(query name, variables)` for every call, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls made for the query named `name`.
    pub fn calls_to(&self, name: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }
}

#[async_trait]
impl FeedClient for MockFeed {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, FeedError> {
        let spec = QuerySpec::by_document(document)
            .ok_or_else(|| FeedError::GraphQl("mock: unknown document".into()))?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((spec.name.to_string(), variables));
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.get_mut(spec.name).and_then(|q| q.pop_front()));
        match reply {
            Some(FeedReply::Fail(message)) => Err(FeedError::Transport(message)),
            Some(FeedReply::Items(items)) => Ok(page(spec.root_field, items)),
            Some(FeedReply::Hang) => std::future::pending().await,
            None => {
                let items = self
                    .repeated
                    .lock()
                    .ok()
                    .and_then(|r| r.get(spec.name).cloned())
                    .unwrap_or_default();
                Ok(page(spec.root_field, items))
            }
        }
    }
}

fn page(root_field: &str, items: Vec<Value>) -> Value {
    let mut data = Map::new();
    data.insert(root_field.to_string(), json!({ "items": items }));
    Value::Object(data)
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// A `ChatTransport` that replays scripted statuses and records every post.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<SendStatus, TransportError>>>,
    reject_containing: Mutex<Vec<String>>,
    hang_containing: Mutex<Vec<String>>,
    posts: Mutex<Vec<OutboundMessage>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next post.
    pub fn script(&self, status: SendStatus) {
        if let Ok(mut s) = self.script.lock() {
            s.push_back(Ok(status));
        }
    }

    /// Queue a network error for the next post.
    pub fn script_network_error(&self, message: &str) {
        if let Ok(mut s) = self.script.lock() {
            s.push_back(Err(TransportError::Network(message.to_string())));
        }
    }

    pub fn script_rate_limit(&self, retry_after_secs: Option<u64>) {
        self.script(SendStatus::RateLimited {
            retry_after: retry_after_secs.map(Duration::from_secs),
        });
    }

    /// Reject, with HTTP 500, every message whose text contains `needle`.
    /// Takes precedence over the script.
    pub fn reject_containing(&self, needle: &str) {
        if let Ok(mut r) = self.reject_containing.lock() {
            r.push(needle.to_string());
        }
    }

    /// Never answer a message whose text contains `needle`.
    pub fn hang_containing(&self, needle: &str) {
        if let Ok(mut h) = self.hang_containing.lock() {
            h.push(needle.to_string());
        }
    }

    /// Every attempted post, retries included.
    pub fn posts(&self) -> Vec<OutboundMessage> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn post(&self, message: &OutboundMessage) -> Result<SendStatus, TransportError> {
        if let Ok(mut posts) = self.posts.lock() {
            posts.push(message.clone());
        }
        if matches_any(&self.hang_containing, &message.text) {
            return std::future::pending().await;
        }
        let rejected = matches_any(&self.reject_containing, &message.text);
        if rejected {
            return Ok(SendStatus::Rejected {
                status: 500,
                body: "mock: rejected".into(),
            });
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(Ok(SendStatus::Delivered))
    }
}

fn matches_any(needles: &Mutex<Vec<String>>, text: &str) -> bool {
    needles
        .lock()
        .map(|n| n.iter().any(|needle| text.contains(needle.as_str())))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// A `SourcePoller` replaying canned poll results.
pub struct MockSource {
    feed: Feed,
    results: Mutex<VecDeque<PollResult>>,
    seen: Mutex<Vec<WatermarkSet>>,
}

impl MockSource {
    pub fn new(feed: Feed) -> Self {
        MockSource {
            feed,
            results: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, result: PollResult) {
        if let Ok(mut r) = self.results.lock() {
            r.push_back(result);
        }
    }

    /// The watermark set passed to each poll, in order.
    pub fn seen(&self) -> Vec<WatermarkSet> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn poll_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// An answered poll with nothing new: one successful query per owned
    /// category.
    pub fn quiet_result(feed: Feed) -> PollResult {
        let mut result = PollResult::empty(feed);
        result.queries = EventCategory::owned_by(feed).count() as u32;
        result
    }
}

#[async_trait]
impl SourcePoller for MockSource {
    fn feed(&self) -> Feed {
        self.feed
    }

    async fn poll(&self, watermarks: &WatermarkSet, _ctx: &RenderContext) -> PollResult {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(watermarks.clone());
        }
        self.results
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Self::quiet_result(self.feed))
    }
}
