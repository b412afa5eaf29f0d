//! One cycle's aggregation and gated commit.
//!
//! Each source's `PollResult` is folded into a `CycleOutcome` by a pure
//! reducer. The outcome is then annotated with the delivery report and
//! finally applied to the watermark set: a category with any failed send
//! keeps its cursor, every other category takes its candidate.

use std::collections::{BTreeMap, BTreeSet};

use crate::delivery::DeliveryReport;
use crate::snapshot::watermark::{CandidateUpdates, CommitOutcome, WatermarkSet};
use crate::types::alert::{Alert, PollResult};
use crate::types::category::{EventCategory, Feed};

// ---------------------------------------------------------------------------
// CycleOutcome
// ---------------------------------------------------------------------------

/// Everything one cycle learned. Discarded after the commit.
#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
    /// Alerts from every source, in source order then feed order.
    pub alerts: Vec<Alert>,
    /// Merged candidate cursors.
    pub candidates: CandidateUpdates,
    /// Failed queries per feed.
    pub poll_errors: BTreeMap<Feed, u32>,
    /// Sources with at least one successful query.
    pub answered: BTreeSet<Feed>,
    /// Categories with at least one failed send.
    pub failed: BTreeSet<EventCategory>,
    /// Failed sends, counted per alert.
    pub delivery_failures: usize,
    pub delivered: usize,
}

impl CycleOutcome {
    /// Fold one source's result in. Candidate conflicts keep the larger
    /// cursor.
    pub fn absorb(mut self, result: PollResult) -> CycleOutcome {
        if result.produced_result() {
            self.answered.insert(result.feed);
        }
        if result.query_failures > 0 {
            *self.poll_errors.entry(result.feed).or_insert(0) += result.query_failures;
        }
        self.alerts.extend(result.alerts);
        self.candidates = self.candidates.merge(result.candidates);
        self
    }

    /// Record what the delivery engine reported for `alerts`.
    pub fn record_delivery(&mut self, report: &DeliveryReport) {
        self.delivered += report.sent;
        self.delivery_failures += report.failures;
        self.failed.extend(report.failed_categories.iter().copied());
    }

    /// Whether any source answered at least one query.
    pub fn produced_result(&self) -> bool {
        !self.answered.is_empty()
    }

    pub fn poll_errors_for(&self, feed: Feed) -> u32 {
        self.poll_errors.get(&feed).copied().unwrap_or(0)
    }

    /// Apply the candidates to `current`, withholding failed categories.
    pub fn commit(&self, current: &WatermarkSet) -> CommitOutcome {
        current.commit(&self.candidates, &self.failed)
    }
}

/// Combine every source's result for one cycle.
pub fn aggregate(results: impl IntoIterator<Item = PollResult>) -> CycleOutcome {
    results
        .into_iter()
        .fold(CycleOutcome::default(), CycleOutcome::absorb)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
