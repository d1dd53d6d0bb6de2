//! Persistence of session records.

pub mod file;
pub mod memory;
pub mod sink;
pub mod traits;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sink::PersistenceSink;
pub use traits::{MAX_SESSION_RECORDS, PERSISTED_WINDOW, SessionLog, SessionRecord};
