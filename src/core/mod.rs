//! Snapshot capture, session state and sampling.

pub mod assembler;
pub mod buffer;
pub mod diff;
pub mod export;
pub mod report;
pub mod sampler;
pub mod snapshot;
pub mod tracker;

pub use assembler::SnapshotAssembler;
pub use buffer::{BUFFER_CAPACITY, SessionBuffer};
pub use export::ExportDocument;
pub use report::{
    ClearOutcome, ClearScope, CurrentState, ExportFormat, ExportSummary, Interaction,
    MonitoringStatus, QueryType, SessionSummary, TrackingEnded, TrackingLog, TrackingStarted,
    TrackingStatus, TrafficSummary,
};
pub use sampler::Sampler;
pub use snapshot::{
    BufferFacts, CommandFacts, ContentDiff, CursorFacts, EditorFacts, EnvironmentFacts, Snapshot,
};
pub use tracker::Tracker;
