//! Result payloads returned by tracker operations.

use super::snapshot::Snapshot;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Lifecycle marker in start/end results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// A sampling task was started.
    TrackingStarted,
    /// The sampling task was ended.
    TrackingEnded,
}

/// Recent part of the session sequence.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficSummary {
    /// Snapshots currently retained.
    pub sequence_length: usize,
    /// The most recent snapshots, oldest first.
    pub recent_interactions: Vec<Snapshot>,
    /// Session start.
    pub session_start: DateTime<Utc>,
    /// A sampling task is active.
    pub is_tracking: bool,
}

/// Result of `track_interaction`.
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    /// The snapshot just taken.
    pub current_snapshot: Snapshot,
    /// Traffic including that snapshot.
    pub traffic_summary: TrafficSummary,
}

/// Result of `start_tracking`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingStarted {
    pub status: TrackingStatus,
    pub interval_seconds: f64,
    pub session_id: String,
}

/// Result of `end_tracking`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEnded {
    pub status: TrackingStatus,
    pub session_summary: SessionSummary,
}

/// Totals for the session so far.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Snapshots currently retained.
    pub total_snapshots: usize,
    /// Seconds since session start.
    pub session_duration: f64,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

/// Result of `get_tracking_log`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingLog {
    pub traffic_data: Vec<Snapshot>,
    pub count: usize,
    pub filter_applied: String,
    /// Requested range, echoed back.
    pub time_range: String,
    pub session_total: usize,
    pub retrieved_at: DateTime<Utc>,
}

/// Result of `get_monitoring_status`.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringStatus {
    pub monitoring_active: bool,
    pub tracking_interval_sec: f64,
    pub auto_save: bool,
    /// Outcome of the most recent bridge call.
    pub emacs_connected: bool,
    pub session_start: DateTime<Utc>,
    pub total_interactions: usize,
}

/// Result of the `current_state` context query.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentState {
    pub current_buffer: String,
    pub current_mode: String,
    pub current_file: Option<String>,
    pub query_timestamp: DateTime<Utc>,
    pub query_type: QueryType,
}

/// Result of `clear_data`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearOutcome {
    pub scope: ClearScope,
    /// In-memory snapshots dropped.
    pub cleared: usize,
}

/// Result of `export_data`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub file: PathBuf,
    pub format: ExportFormat,
    pub interactions: usize,
    pub anonymized: bool,
}

/// Supported context queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Buffer, mode and file of the current buffer.
    CurrentState,
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_state" => Ok(Self::CurrentState),
            other => Err(Error::Unsupported(format!(
                "query type '{other}' (available: current_state)"
            ))),
        }
    }
}

/// What `clear_data` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearScope {
    /// The in-memory session sequence.
    CurrentSession,
    /// The session sequence and the persisted log.
    All,
}

impl FromStr for ClearScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_session" => Ok(Self::CurrentSession),
            "all" => Ok(Self::All),
            other => Err(Error::Unsupported(format!("clear scope '{other}'"))),
        }
    }
}

/// Export document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Pretty JSON document.
    Json,
    /// One row per interaction, nested fields flattened into columns.
    Csv,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::Unsupported(format!("export format '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_values() {
        assert_eq!("current_state".parse::<QueryType>().unwrap(), QueryType::CurrentState);
        assert_eq!("all".parse::<ClearScope>().unwrap(), ClearScope::All);
        assert_eq!(
            "current_session".parse::<ClearScope>().unwrap(),
            ClearScope::CurrentSession
        );
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    }

    #[test]
    fn unknown_values_are_unsupported() {
        assert!(matches!("recent_files".parse::<QueryType>(), Err(Error::Unsupported(_))));
        assert!(matches!("today".parse::<ClearScope>(), Err(Error::Unsupported(_))));
        assert!(matches!("org".parse::<ExportFormat>(), Err(Error::Unsupported(_))));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TrackingStatus::TrackingStarted).unwrap();
        assert_eq!(json, "\"tracking_started\"");
    }
}
