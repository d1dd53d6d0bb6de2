//! In-memory storage backend for testing.

use crate::error::Result;
use crate::storage::traits::{SessionLog, SessionRecord};
use std::sync::{PoisonError, RwLock};

/// In-memory storage backend for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<Vec<SessionRecord>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionLog for MemoryBackend {
    fn load(&self) -> Result<Vec<SessionRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.clone())
    }

    fn save(&self, records: &[SessionRecord]) -> Result<()> {
        let mut stored = self.records.write().unwrap_or_else(PoisonError::into_inner);
        *stored = records.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut stored = self.records.write().unwrap_or_else(PoisonError::into_inner);
        stored.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(session_id: &str) -> SessionRecord {
        SessionRecord {
            session_id: session_id.to_string(),
            interactions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn load_empty() {
        let store = MemoryBackend::new();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_contents() {
        let store = MemoryBackend::new();
        store.save(&[record("a"), record("b")]).unwrap();
        store.save(&[record("c")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].session_id, "c");
    }

    #[test]
    fn clear_empties() {
        let store = MemoryBackend::new();
        store.save(&[record("a")]).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn concurrent_saves_and_loads() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryBackend::new());
        let mut handles = vec![];

        for i in 0..5 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..20 {
                    store_clone.save(&[record(&format!("w-{i}-{j}"))]).unwrap();
                    let _ = store_clone.load().unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // Last writer wins; the log is never torn.
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
