//! Best-effort flushing of session data to the log.

use crate::error::Result;
use crate::storage::traits::{MAX_SESSION_RECORDS, SessionLog, SessionRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// Appends session records to a [`SessionLog`], never failing its caller.
#[derive(Clone)]
pub struct PersistenceSink {
    store: Arc<dyn SessionLog>,
}

impl PersistenceSink {
    /// Create a sink over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionLog>) -> Self {
        Self { store }
    }

    /// Underlying log.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionLog> {
        &self.store
    }

    /// Append a captured record. Storage errors are logged and dropped.
    ///
    /// Loads and saves the whole log with blocking file I/O on the calling
    /// thread. The log is capped at a few dozen small records.
    pub fn write(&self, record: SessionRecord) {
        let session_id = record.session_id.clone();
        match self.try_write(record) {
            Ok(total) => debug!("flushed session {session_id} ({total} record(s) on disk)"),
            Err(e) => warn!("failed to flush session {session_id}: {e}"),
        }
    }

    fn try_write(&self, record: SessionRecord) -> Result<usize> {
        let mut records = self.store.load()?;
        records.push(record);

        if records.len() > MAX_SESSION_RECORDS {
            let excess = records.len() - MAX_SESSION_RECORDS;
            records.drain(..excess);
        }

        self.store.save(&records)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionBuffer;
    use crate::core::snapshot::sample_snapshot;
    use crate::storage::traits::PERSISTED_WINDOW;
    use crate::storage::{FileBackend, MemoryBackend};
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn flush(sink: &PersistenceSink, buffer: &SessionBuffer) {
        sink.write(SessionRecord::capture(buffer, Utc::now()));
    }

    #[test]
    fn first_flush_creates_one_record() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileBackend::new(temp.path().to_path_buf()).unwrap());
        let sink = PersistenceSink::new(store.clone());

        let mut buffer = SessionBuffer::new();
        buffer.append(sample_snapshot("a"));
        flush(&sink, &buffer);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session_id, buffer.session_id());
        assert_eq!(records[0].interactions.len(), 1);
    }

    #[test]
    fn log_is_capped_to_most_recent_records() {
        let store = Arc::new(MemoryBackend::new());
        let sink = PersistenceSink::new(store.clone());
        let mut buffer = SessionBuffer::new();

        for _ in 0..=MAX_SESSION_RECORDS {
            buffer.append(sample_snapshot("a"));
            flush(&sink, &buffer);
        }

        let records = store.load().unwrap();
        assert_eq!(records.len(), MAX_SESSION_RECORDS);
        // Flush k (0-based) saw positions up to k; the oldest kept is flush 1.
        let newest = records.last().unwrap().interactions.last().unwrap();
        assert_eq!(newest.sequence_position, MAX_SESSION_RECORDS as u64);
        let oldest = records.first().unwrap().interactions.last().unwrap();
        assert_eq!(oldest.sequence_position, 1);
    }

    #[test]
    fn record_holds_last_twenty_interactions() {
        let store = Arc::new(MemoryBackend::new());
        let sink = PersistenceSink::new(store.clone());
        let mut buffer = SessionBuffer::new();
        for _ in 0..30 {
            buffer.append(sample_snapshot("a"));
        }

        flush(&sink, &buffer);

        let interactions = &store.load().unwrap()[0].interactions;
        assert_eq!(interactions.len(), PERSISTED_WINDOW);
        assert_eq!(interactions[0].sequence_position, 10);
        assert_eq!(interactions[19].sequence_position, 29);
    }

    #[test]
    fn unreadable_log_is_swallowed_and_left_alone() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileBackend::new(temp.path().to_path_buf()).unwrap());
        fs::write(store.log_path(), "not json").unwrap();

        let sink = PersistenceSink::new(store.clone());
        flush(&sink, &SessionBuffer::new());

        assert_eq!(fs::read_to_string(store.log_path()).unwrap(), "not json");
    }

    #[test]
    fn empty_buffer_still_writes_a_record() {
        let store = Arc::new(MemoryBackend::new());
        let sink = PersistenceSink::new(store.clone());
        flush(&sink, &SessionBuffer::new());

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].interactions.is_empty());
    }
}
