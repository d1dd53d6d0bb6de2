//! In-memory session sequence.

use super::snapshot::{ContentDiff, EditorFacts, Snapshot};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Maximum snapshots kept in memory.
pub const BUFFER_CAPACITY: usize = 100;

/// Ordered, capacity-bounded sequence of snapshots for one session.
///
/// The retained window is always a contiguous suffix of the append order.
#[derive(Debug)]
pub struct SessionBuffer {
    started_at: DateTime<Utc>,
    entries: VecDeque<Snapshot>,
    next_position: u64,
    /// Most recent full text per buffer name, for the next diff.
    last_contents: HashMap<String, String>,
}

impl SessionBuffer {
    /// Start a new session now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start a new session at a given time.
    #[must_use]
    pub fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            entries: VecDeque::with_capacity(BUFFER_CAPACITY + 1),
            next_position: 0,
            last_contents: HashMap::new(),
        }
    }

    /// Session start time.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Session identifier (the start time, RFC 3339).
    #[must_use]
    pub fn session_id(&self) -> String {
        self.started_at.to_rfc3339()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retained snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Append a snapshot, assigning its sequence position.
    ///
    /// Drops the oldest entry once the capacity is exceeded.
    pub fn append(&mut self, mut snapshot: Snapshot) -> &Snapshot {
        snapshot.sequence_position = self.next_position;
        self.next_position += 1;

        self.entries.push_back(snapshot);
        while self.entries.len() > BUFFER_CAPACITY {
            self.entries.pop_front();
        }

        &self.entries[self.entries.len() - 1]
    }

    /// Diff `facts` against the cached text, compose and append.
    ///
    /// The cache keeps only the latest text per buffer name.
    pub fn record(&mut self, facts: EditorFacts, timestamp: DateTime<Utc>) -> Snapshot {
        let previous = self.last_contents.get(&facts.buffer.name);
        let content = ContentDiff::compute(&facts.text, previous.map(String::as_str));

        self.last_contents
            .insert(facts.buffer.name.clone(), facts.text.clone());

        self.append(Snapshot::compose(facts, content, timestamp))
            .clone()
    }

    /// The last `n` snapshots in original order (fewer if shorter).
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<Snapshot> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Drop every snapshot and return how many were dropped.
    ///
    /// Position numbering restarts at 0, so positions are not unique
    /// across a clear. The diff cache is kept.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        self.next_position = 0;
        cleared
    }
}

impl Default for SessionBuffer {
    fn default() -> Self {
        Self::new()
    }
}
