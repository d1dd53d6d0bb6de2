//! Storage trait definitions.

use crate::core::{SessionBuffer, Snapshot};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshots written with each record.
pub const PERSISTED_WINDOW: usize = 20;

/// Records kept in the log.
pub const MAX_SESSION_RECORDS: usize = 50;

/// Durable, ordered log of session records (oldest first).
pub trait SessionLog: Send + Sync {
    /// Read every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be read or parsed.
    fn load(&self) -> Result<Vec<SessionRecord>>;

    /// Replace the log with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn save(&self, records: &[SessionRecord]) -> Result<()>;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn clear(&self) -> Result<()>;
}

/// One flush of a session's recent interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session start time, RFC 3339.
    pub session_id: String,

    /// Most recent snapshots at flush time, oldest first.
    pub interactions: Vec<Snapshot>,

    /// When the flush happened.
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    /// Capture the tail of `buffer` as of `now`.
    #[must_use]
    pub fn capture(buffer: &SessionBuffer, now: DateTime<Utc>) -> Self {
        Self {
            session_id: buffer.session_id(),
            interactions: buffer.recent(PERSISTED_WINDOW),
            timestamp: now,
        }
    }
}
