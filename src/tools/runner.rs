//! Tool dispatch logic.

use crate::core::{ClearScope, ExportFormat, QueryType, Tracker};
use crate::error::{Error, Result};
use crate::tools::input::{
    ClearArgs, ContextArgs, ExportArgs, RecentTrafficArgs, StartTrackingArgs, ToolCall,
    TrackingLogArgs,
};
use crate::tools::output::ToolResponse;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Every tool the tracker answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    TrackInteraction,
    GetRecentTraffic,
    StartTracking,
    EndTracking,
    TakeSnapshot,
    GetTrackingLog,
    GetMonitoringStatus,
    QueryInteractionContext,
    ClearData,
    ExportData,
}

impl Tool {
    /// All tools, in listing order.
    pub const ALL: [Self; 10] = [
        Self::TrackInteraction,
        Self::GetRecentTraffic,
        Self::StartTracking,
        Self::EndTracking,
        Self::TakeSnapshot,
        Self::GetTrackingLog,
        Self::GetMonitoringStatus,
        Self::QueryInteractionContext,
        Self::ClearData,
        Self::ExportData,
    ];

    /// Wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TrackInteraction => "track_interaction",
            Self::GetRecentTraffic => "get_recent_traffic",
            Self::StartTracking => "start_tracking",
            Self::EndTracking => "end_tracking",
            Self::TakeSnapshot => "take_snapshot",
            Self::GetTrackingLog => "get_tracking_log",
            Self::GetMonitoringStatus => "get_monitoring_status",
            Self::QueryInteractionContext => "query_interaction_context",
            Self::ClearData => "clear_data",
            Self::ExportData => "export_data",
        }
    }

    /// Look a tool up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Prefix for failure messages.
    fn action(self) -> &'static str {
        match self {
            Self::TrackInteraction => "Failed to track interaction",
            Self::GetRecentTraffic => "Failed to get recent traffic",
            Self::StartTracking => "Failed to start tracking",
            Self::EndTracking => "Failed to end tracking",
            Self::TakeSnapshot => "Failed to take snapshot",
            Self::GetTrackingLog => "Failed to get tracking log",
            Self::GetMonitoringStatus => "Failed to get monitoring status",
            Self::QueryInteractionContext => "Failed to query context",
            Self::ClearData => "Failed to clear data",
            Self::ExportData => "Export failed",
        }
    }
}

/// Dispatch a tool call against `tracker`.
///
/// Never fails: every error is turned into a failure envelope.
pub async fn dispatch_tool(call: &ToolCall, tracker: &Tracker) -> ToolResponse {
    let Some(tool) = Tool::from_name(&call.tool) else {
        warn!("unknown tool: {}", call.tool);
        return ToolResponse::failure(format!("Unknown tool: {}", call.tool));
    };

    debug!(tool = tool.name(), "dispatching tool call");
    match run(tool, call, tracker).await {
        Ok(result) => ToolResponse::success(result),
        Err(e) => {
            debug!(tool = tool.name(), "tool call failed: {e}");
            ToolResponse::from_error(tool.action(), &e)
        }
    }
}

async fn run(tool: Tool, call: &ToolCall, tracker: &Tracker) -> Result<Value> {
    let result = match tool {
        Tool::TrackInteraction => serde_json::to_value(tracker.track_interaction().await?)?,
        Tool::GetRecentTraffic => {
            let args: RecentTrafficArgs = call.args()?;
            serde_json::to_value(tracker.recent_traffic(args.count))?
        }
        Tool::StartTracking => {
            let args: StartTrackingArgs = call.args()?;
            serde_json::to_value(tracker.start_tracking(args.interval_sec).await?)?
        }
        Tool::EndTracking => serde_json::to_value(tracker.end_tracking().await?)?,
        Tool::TakeSnapshot => json!({ "snapshot": tracker.take_snapshot().await? }),
        Tool::GetTrackingLog => {
            let args: TrackingLogArgs = call.args()?;
            let log = tracker.tracking_log(args.limit, &args.filter_type, &args.time_range)?;
            serde_json::to_value(log)?
        }
        Tool::GetMonitoringStatus => serde_json::to_value(tracker.monitoring_status())?,
        Tool::QueryInteractionContext => {
            let args: ContextArgs = call.args()?;
            let query: QueryType = args.query_type.parse()?;
            serde_json::to_value(tracker.query_context(query).await)?
        }
        Tool::ClearData => {
            let args: ClearArgs = call.args()?;
            let scope: ClearScope = args.clear_scope.parse()?;
            serde_json::to_value(tracker.clear(scope, args.confirm)?)?
        }
        Tool::ExportData => {
            let args: ExportArgs = call.args()?;
            let path = args
                .output_file
                .ok_or_else(|| Error::InvalidArgument("output_file is required".to_string()))?;
            let format: ExportFormat = args.export_format.parse()?;
            serde_json::to_value(tracker.export(&path, format, args.anonymize)?)?
        }
    };
    Ok(result)
}
