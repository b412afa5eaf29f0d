use serde::{Deserialize, Serialize};

use super::category::{EventCategory, Feed};
use crate::snapshot::watermark::CandidateUpdates;

/// A rendered notification, ready for the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub category: EventCategory,
    pub message: String,
    /// Deliver without a notification sound.
    pub silent: bool,
}

impl Alert {
    pub fn new(category: EventCategory, message: impl Into<String>) -> Self {
        Alert {
            category,
            message: message.into(),
            silent: false,
        }
    }
}

/// One source's output for one cycle.
#[derive(Debug, Clone)]
pub struct PollResult {
    pub feed: Feed,
    /// Alerts in feed order.
    pub alerts: Vec<Alert>,
    /// Candidate cursors; a category is absent when its page was empty or
    /// its query failed.
    pub candidates: CandidateUpdates,
    /// Number of per-category queries issued.
    pub queries: u32,
    /// Number of those queries that failed.
    pub query_failures: u32,
}

impl PollResult {
    pub fn empty(feed: Feed) -> Self {
        PollResult {
            feed,
            alerts: Vec::new(),
            candidates: CandidateUpdates::new(),
            queries: 0,
            query_failures: 0,
        }
    }

    /// Whether at least one query of this source succeeded.
    pub fn produced_result(&self) -> bool {
        self.query_failures < self.queries
    }

    pub fn alerts_for(&self, category: EventCategory) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.category == category)
    }
}
