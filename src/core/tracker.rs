//! Session context shared by every tracker operation.

use super::assembler::SnapshotAssembler;
use super::buffer::SessionBuffer;
use super::export::ExportDocument;
use super::report::{
    ClearOutcome, ClearScope, CurrentState, ExportFormat, ExportSummary, Interaction,
    MonitoringStatus, QueryType, SessionSummary, TrackingEnded, TrackingLog, TrackingStarted,
    TrackingStatus, TrafficSummary,
};
use super::sampler::Sampler;
use super::snapshot::Snapshot;
use crate::bridge::{EvalBridge, NIL, decode_string};
use crate::config::TrackingConfig;
use crate::error::{Error, Result};
use crate::storage::{PersistenceSink, SessionLog, SessionRecord};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Snapshots returned alongside a fresh interaction.
pub const DEFAULT_RECENT_COUNT: usize = 5;

/// Entries returned by the tracking log when no limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Upper bound on tracking log entries.
pub const MAX_LOG_LIMIT: usize = 100;

/// Shortest accepted sampling interval in seconds.
pub const MIN_INTERVAL_SECONDS: f64 = 0.1;

/// Longest accepted sampling interval in seconds.
pub const MAX_INTERVAL_SECONDS: f64 = 60.0;

const CURRENT_BUFFER_EXPRESSION: &str = "(buffer-name)";
const CURRENT_MODE_EXPRESSION: &str = "(symbol-name major-mode)";
const CURRENT_FILE_EXPRESSION: &str = "(buffer-file-name)";

/// Sampling flag readable without waiting on the sampler.
#[derive(Debug, Clone, Copy)]
struct SamplingState {
    active: bool,
    interval_seconds: f64,
}

/// One tracking session: buffer, sampler and sink around a bridge.
///
/// Read-only queries never wait for an in-flight sampler start or stop.
pub struct Tracker {
    bridge: Arc<dyn EvalBridge>,
    assembler: SnapshotAssembler,
    session: Arc<Mutex<SessionBuffer>>,
    sampler: tokio::sync::Mutex<Sampler>,
    sampling: Mutex<SamplingState>,
    sink: PersistenceSink,
    settings: TrackingConfig,
}

impl Tracker {
    /// Start a fresh session over `bridge`, persisting into `store`.
    #[must_use]
    pub fn new(
        bridge: Arc<dyn EvalBridge>,
        store: Arc<dyn SessionLog>,
        settings: TrackingConfig,
    ) -> Self {
        Self {
            assembler: SnapshotAssembler::new(Arc::clone(&bridge)),
            bridge,
            session: Arc::new(Mutex::new(SessionBuffer::new())),
            sampler: tokio::sync::Mutex::new(Sampler::new()),
            sampling: Mutex::new(SamplingState {
                active: false,
                interval_seconds: settings.interval_seconds,
            }),
            sink: PersistenceSink::new(store),
            settings,
        }
    }

    /// Bridge used for every round-trip.
    #[must_use]
    pub fn bridge(&self) -> &Arc<dyn EvalBridge> {
        &self.bridge
    }

    /// Persisted session log.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionLog> {
        self.sink.store()
    }

    /// Whether a sampling task is active.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.sampling_state().active
    }

    /// Snapshots currently held in memory.
    #[must_use]
    pub fn session_len(&self) -> usize {
        self.lock_session().len()
    }

    /// Take one snapshot and append it to the session.
    ///
    /// Flushes to the log afterwards when not sampling and auto-save is on.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer info response is malformed.
    pub async fn take_snapshot(&self) -> Result<Snapshot> {
        let snapshot = self.assembler.assemble(&self.session).await?;
        if self.settings.auto_save && !self.is_tracking() {
            self.flush();
        }
        Ok(snapshot)
    }

    /// Take a snapshot and report it with the recent traffic.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be taken.
    pub async fn track_interaction(&self) -> Result<Interaction> {
        let current_snapshot = self.take_snapshot().await?;
        Ok(Interaction {
            current_snapshot,
            traffic_summary: self.recent_traffic(DEFAULT_RECENT_COUNT),
        })
    }

    /// The last `count` snapshots, oldest first.
    #[must_use]
    pub fn recent_traffic(&self, count: usize) -> TrafficSummary {
        let is_tracking = self.is_tracking();
        let buffer = self.lock_session();
        TrafficSummary {
            sequence_length: buffer.len(),
            recent_interactions: buffer.recent(count),
            session_start: buffer.started_at(),
            is_tracking,
        }
    }

    /// Start sampling every `interval_seconds`, or the configured default.
    ///
    /// Finite positive intervals are clamped to the accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a non-finite or non-positive
    /// interval and [`Error::AlreadyTracking`] if sampling is active.
    pub async fn start_tracking(&self, interval_seconds: Option<f64>) -> Result<TrackingStarted> {
        let interval = clamp_interval(interval_seconds.unwrap_or(self.settings.interval_seconds))?;

        let mut sampler = self.sampler.lock().await;
        let assembler = self.assembler.clone();
        let session = Arc::clone(&self.session);
        sampler.start(interval, move || {
            let assembler = assembler.clone();
            let session = Arc::clone(&session);
            async move { assembler.assemble(&session).await.map(|_| ()) }
        })?;

        let interval_seconds = interval.as_secs_f64();
        *self.lock_sampling() = SamplingState {
            active: true,
            interval_seconds,
        };
        drop(sampler);

        let session_id = self.lock_session().session_id();
        info!("tracking started for session {session_id} every {interval_seconds}s");
        Ok(TrackingStarted {
            status: TrackingStatus::TrackingStarted,
            interval_seconds,
            session_id,
        })
    }

    /// Stop sampling, flush the session and summarize it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotTracking`] if no sampling task is active.
    pub async fn end_tracking(&self) -> Result<TrackingEnded> {
        let mut sampler = self.sampler.lock().await;
        if !sampler.is_running() {
            return Err(Error::NotTracking);
        }
        self.lock_sampling().active = false;
        let ticks = sampler.stop().await?;
        drop(sampler);

        let session_end = Utc::now();
        let (record, session_summary) = {
            let buffer = self.lock_session();
            let summary = SessionSummary {
                total_snapshots: buffer.len(),
                session_duration: elapsed_seconds(buffer.started_at(), session_end),
                session_start: buffer.started_at(),
                session_end,
            };
            (SessionRecord::capture(&buffer, session_end), summary)
        };
        self.sink.write(record);

        info!(
            "tracking ended after {ticks} tick(s), {} snapshot(s) retained",
            session_summary.total_snapshots
        );
        Ok(TrackingEnded {
            status: TrackingStatus::TrackingEnded,
            session_summary,
        })
    }

    /// Recent snapshots, optionally filtered by a case-insensitive substring.
    ///
    /// `limit` is clamped to `1..=100`. A filter of `"all"` keeps everything.
    /// `time_range` is echoed back; only the current session is in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be serialized for filtering.
    pub fn tracking_log(
        &self,
        limit: usize,
        filter: &str,
        time_range: &str,
    ) -> Result<TrackingLog> {
        let limit = limit.clamp(1, MAX_LOG_LIMIT);
        let (recent, session_total) = {
            let buffer = self.lock_session();
            (buffer.recent(limit), buffer.len())
        };

        let traffic_data = if filter == "all" {
            recent
        } else {
            let needle = filter.to_lowercase();
            let mut kept = Vec::with_capacity(recent.len());
            for snapshot in recent {
                if serde_json::to_string(&snapshot)?.to_lowercase().contains(&needle) {
                    kept.push(snapshot);
                }
            }
            kept
        };

        Ok(TrackingLog {
            count: traffic_data.len(),
            traffic_data,
            filter_applied: filter.to_string(),
            time_range: time_range.to_string(),
            session_total,
            retrieved_at: Utc::now(),
        })
    }

    /// Sampling, connectivity and session counters.
    #[must_use]
    pub fn monitoring_status(&self) -> MonitoringStatus {
        let sampling = self.sampling_state();
        let buffer = self.lock_session();
        MonitoringStatus {
            monitoring_active: sampling.active,
            tracking_interval_sec: sampling.interval_seconds,
            auto_save: self.settings.auto_save,
            emacs_connected: self.bridge.is_connected(),
            session_start: buffer.started_at(),
            total_interactions: buffer.len(),
        }
    }

    /// Answer a context query.
    pub async fn query_context(&self, query: QueryType) -> CurrentState {
        match query {
            QueryType::CurrentState => self.current_state().await,
        }
    }

    /// Current buffer, mode and file, straight from the editor.
    pub async fn current_state(&self) -> CurrentState {
        let buffer = self.bridge.evaluate(CURRENT_BUFFER_EXPRESSION).await;
        let mode = self.bridge.evaluate(CURRENT_MODE_EXPRESSION).await;
        let file = self.bridge.evaluate(CURRENT_FILE_EXPRESSION).await;

        CurrentState {
            current_buffer: decode_string(&buffer),
            current_mode: decode_string(&mode),
            current_file: (file != NIL).then(|| decode_string(&file)),
            query_timestamp: Utc::now(),
            query_type: QueryType::CurrentState,
        }
    }

    /// Drop session data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without `confirm`, or a storage
    /// error if the persisted log cannot be removed.
    pub fn clear(&self, scope: ClearScope, confirm: bool) -> Result<ClearOutcome> {
        if !confirm {
            return Err(Error::InvalidArgument(
                "confirmation required, set confirm to true".to_string(),
            ));
        }

        let cleared = self.lock_session().clear();
        if scope == ClearScope::All {
            self.sink.store().clear()?;
        }

        info!("cleared {cleared} snapshot(s) ({scope:?})");
        Ok(ClearOutcome { scope, cleared })
    }

    /// Write the session sequence to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn export(
        &self,
        path: &Path,
        format: ExportFormat,
        anonymize: bool,
    ) -> Result<ExportSummary> {
        let document = {
            let buffer = self.lock_session();
            ExportDocument::build(&buffer, format, anonymize, Utc::now())
        };
        document.write_to(path)?;

        debug!(
            "exported {} interaction(s) to {}",
            document.total_interactions,
            path.display()
        );
        Ok(ExportSummary {
            file: path.to_path_buf(),
            format,
            interactions: document.total_interactions,
            anonymized: anonymize,
        })
    }

    /// End an active sampling task, if any.
    pub async fn shutdown(&self) {
        if self.is_tracking() {
            match self.end_tracking().await {
                Ok(ended) => debug!(
                    "ended tracking on shutdown ({} snapshot(s))",
                    ended.session_summary.total_snapshots
                ),
                Err(e) => debug!("nothing to end on shutdown: {e}"),
            }
        }
    }

    fn flush(&self) {
        let record = SessionRecord::capture(&self.lock_session(), Utc::now());
        self.sink.write(record);
    }

    fn lock_session(&self) -> MutexGuard<'_, SessionBuffer> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sampling(&self) -> MutexGuard<'_, SamplingState> {
        self.sampling.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sampling_state(&self) -> SamplingState {
        *self.lock_sampling()
    }
}

/// Validate and clamp a sampling interval.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for non-finite or non-positive values.
pub fn clamp_interval(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "interval must be a positive number of seconds, got {seconds}"
        )));
    }
    Ok(Duration::from_secs_f64(
        seconds.clamp(MIN_INTERVAL_SECONDS, MAX_INTERVAL_SECONDS),
    ))
}

fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).to_std().map_or(0.0, |d| d.as_secs_f64())
}
