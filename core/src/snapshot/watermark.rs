//! Watermark values: per-category cursors and the candidate updates a poll
//! cycle proposes for them.
//!
//! A `WatermarkSet` always holds exactly one cursor for every
//! `EventCategory`. It is never mutated in place by the cycle: `commit`
//! produces the next set from a `CandidateUpdates` value and the cycle's
//! failed-category set.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::types::category::EventCategory;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// An opaque, string-encoded ordering key (typically a block timestamp).
///
/// Values may exceed `u64`, so comparisons are done on the decimal text
/// rather than by parsing. Deserialization only accepts non-empty strings
/// of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(String);

impl Cursor {
    /// The default cursor used for genesis initialization and missing keys.
    pub fn genesis() -> Self {
        Cursor("0".to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    pub fn from_epoch_secs(secs: i64) -> Self {
        Cursor(secs.max(0).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two cursors as unsigned decimal integers of arbitrary width.
    /// Leading zeros are ignored.
    pub fn numeric_cmp(&self, other: &Cursor) -> Ordering {
        let a = self.0.trim_start_matches('0');
        let b = other.0.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }

    /// Whether this cursor is strictly past `other`.
    pub fn is_after(&self, other: &Cursor) -> bool {
        self.numeric_cmp(other) == Ordering::Greater
    }
}

impl TryFrom<String> for Cursor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("cursor must be an unsigned decimal, got \"{}\"", value));
        }
        Ok(Cursor(value))
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> String {
        cursor.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// WatermarkSet
// ---------------------------------------------------------------------------

/// The full category universe mapped to cursor values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSet {
    cursors: [Cursor; EventCategory::COUNT],
}

impl WatermarkSet {
    /// Every category set to the same cursor.
    pub fn uniform(cursor: Cursor) -> Self {
        WatermarkSet {
            cursors: std::array::from_fn(|_| cursor.clone()),
        }
    }

    /// Build a complete set from a possibly partial map, filling absent
    /// categories with `default`. Present values are kept verbatim.
    pub fn from_partial(partial: BTreeMap<EventCategory, Cursor>, default: &Cursor) -> Self {
        let mut set = Self::uniform(default.clone());
        for (category, cursor) in partial {
            set.cursors[category as usize] = cursor;
        }
        set
    }

    pub fn get(&self, category: EventCategory) -> &Cursor {
        &self.cursors[category as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventCategory, &Cursor)> {
        EventCategory::ALL.into_iter().zip(self.cursors.iter())
    }

    /// Apply candidate updates for every category not in `failed`.
    ///
    /// A candidate that would move a cursor backwards is ignored; cursors
    /// are non-decreasing.
    pub fn commit(
        &self,
        candidates: &CandidateUpdates,
        failed: &BTreeSet<EventCategory>,
    ) -> CommitOutcome {
        let mut next = self.clone();
        let mut advanced = Vec::new();
        let mut withheld = Vec::new();

        for (category, candidate) in candidates.iter() {
            if failed.contains(&category) {
                withheld.push(category);
                continue;
            }
            let current = &mut next.cursors[category as usize];
            if candidate.is_after(current) {
                *current = candidate.clone();
                advanced.push(category);
            }
        }

        CommitOutcome {
            watermarks: next,
            advanced,
            withheld,
        }
    }
}

impl Serialize for WatermarkSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cursors.len()))?;
        for (category, cursor) in self.iter() {
            map.serialize_entry(&category, cursor)?;
        }
        map.end()
    }
}

/// Result of `WatermarkSet::commit`.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The watermark set after the commit.
    pub watermarks: WatermarkSet,
    /// Categories whose cursor moved forward.
    pub advanced: Vec<EventCategory>,
    /// Categories that had a candidate but were vetoed by a delivery failure.
    pub withheld: Vec<EventCategory>,
}

// ---------------------------------------------------------------------------
// CandidateUpdates
// ---------------------------------------------------------------------------

/// Proposed new cursors, keyed by category. Absence means "no new items",
/// not "reset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateUpdates {
    proposals: BTreeMap<EventCategory, Cursor>,
}

impl CandidateUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose `cursor` for `category`, keeping the larger value if one is
    /// already present.
    pub fn propose(&mut self, category: EventCategory, cursor: Cursor) {
        match self.proposals.get(&category) {
            Some(existing) if !cursor.is_after(existing) => {}
            _ => {
                self.proposals.insert(category, cursor);
            }
        }
    }

    /// Combine two proposal sets. Conflicts resolve to the larger cursor.
    pub fn merge(mut self, other: CandidateUpdates) -> CandidateUpdates {
        for (category, cursor) in other.proposals {
            self.propose(category, cursor);
        }
        self
    }

    pub fn get(&self, category: EventCategory) -> Option<&Cursor> {
        self.proposals.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventCategory, &Cursor)> {
        self.proposals.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
