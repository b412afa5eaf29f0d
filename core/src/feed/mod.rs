//! Source pollers: one per indexer.
//!
//! A poller issues one query per category it owns, using that category's
//! current watermark as the lower bound. Each query is isolated: a failure
//! is logged and only costs that category its candidate update this cycle.
//! A non-empty page always proposes the last item's cursor, even when no
//! item produced an alert.

pub mod juicedollar;
pub mod juiceswap;
pub mod queries;
pub mod records;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::infrastructure::{FeedClient, REQUEST_TIMEOUT};
use crate::render::RenderContext;
use crate::snapshot::watermark::{Cursor, WatermarkSet};
use crate::types::alert::{Alert, PollResult};
use crate::types::category::{EventCategory, Feed};

use self::queries::QuerySpec;

/// One feed's incremental poll.
#[async_trait]
pub trait SourcePoller: Send + Sync {
    fn feed(&self) -> Feed;

    /// Query every owned category once, starting after its watermark.
    async fn poll(&self, watermarks: &WatermarkSet, ctx: &RenderContext) -> PollResult;
}

/// Fetch and decode one page of `spec` strictly after `watermark`.
pub async fn fetch_page<T: DeserializeOwned>(
    client: &dyn FeedClient,
    spec: &QuerySpec,
    watermark: &Cursor,
) -> Result<Vec<T>, FeedError> {
    let variables = json!({ "watermark": watermark.as_str() });
    let data = tokio::time::timeout(REQUEST_TIMEOUT, client.query(spec.document, variables))
        .await
        .map_err(|_| FeedError::Timeout(REQUEST_TIMEOUT))??;
    decode_items(&data, spec.root_field)
}

/// Pull `<root_field>.items` out of a `data` object.
pub fn decode_items<T: DeserializeOwned>(data: &Value, root_field: &str) -> Result<Vec<T>, FeedError> {
    let items = data
        .get(root_field)
        .and_then(|root| root.get("items"))
        .ok_or_else(|| FeedError::Schema(format!("missing {}.items", root_field)))?;
    Ok(serde_json::from_value(items.clone())?)
}

/// The cursor of the last item on a page, if it has one.
pub fn last_cursor<'a, T>(items: &'a [T], cursor_of: impl Fn(&'a T) -> Option<&'a str>) -> Option<Cursor> {
    items
        .last()
        .and_then(cursor_of)
        .filter(|c| !c.is_empty())
        .map(Cursor::new)
}

// ---------------------------------------------------------------------------
// PollBuilder
// ---------------------------------------------------------------------------

/// Accumulates per-category query outcomes into a `PollResult`.
pub struct PollBuilder {
    result: PollResult,
}

impl PollBuilder {
    pub fn new(feed: Feed) -> Self {
        PollBuilder {
            result: PollResult::empty(feed),
        }
    }

    /// Count a query that failed. The categories it serves get no
    /// candidate this cycle.
    pub fn failed(&mut self, categories: &[EventCategory], error: &FeedError) {
        self.result.queries += 1;
        self.result.query_failures += 1;
        warn!(
            feed = %self.result.feed,
            categories = ?categories,
            error = %error,
            "feed query failed"
        );
    }

    /// Count a query that answered, without recording anything yet.
    pub fn answered(&mut self) {
        self.result.queries += 1;
    }

    pub fn alert(&mut self, alert: Alert) {
        self.result.alerts.push(alert);
    }

    pub fn propose(&mut self, category: EventCategory, cursor: Option<Cursor>) {
        if let Some(cursor) = cursor {
            self.result.candidates.propose(category, cursor);
        }
    }

    /// Record the common single-category shape: every item rendered by
    /// `render` (returning `None` to skip it), candidate from the last item.
    pub fn page<T>(
        &mut self,
        category: EventCategory,
        outcome: Result<Vec<T>, FeedError>,
        cursor_of: impl Fn(&T) -> Option<&str>,
        render: impl Fn(&T) -> Option<String>,
    ) {
        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                self.failed(&[category], &e);
                return;
            }
        };
        self.answered();
        if items.is_empty() {
            return;
        }
        let mut alerted = 0usize;
        for item in &items {
            if let Some(message) = render(item) {
                self.alert(Alert::new(category, message));
                alerted += 1;
            }
        }
        let candidate = last_cursor(&items, |item| cursor_of(item));
        debug!(
            feed = %self.result.feed,
            category = %category,
            items = items.len(),
            alerts = alerted,
            cursor = ?candidate.as_ref().map(Cursor::as_str),
            "page mapped"
        );
        self.propose(category, candidate);
    }

    pub fn finish(self) -> PollResult {
        self.result
    }
}
