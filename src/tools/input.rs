//! Tool call parsing.

use crate::core::tracker::{DEFAULT_LOG_LIMIT, DEFAULT_RECENT_COUNT};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

/// One request line read from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    /// Opaque request id, echoed in the reply.
    #[serde(default)]
    pub id: Option<Value>,

    /// Tool name.
    pub tool: String,

    /// Tool arguments object. Missing or null means no arguments.
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Build a call without an id.
    #[must_use]
    pub fn new(tool: &str, arguments: Value) -> Self {
        Self {
            id: None,
            tool: tool.to_string(),
            arguments,
        }
    }

    /// Decode the arguments into `T`, using its defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the arguments have the wrong shape.
    pub fn args<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if self.arguments.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(self.arguments.clone())
            .map_err(|e| Error::InvalidArgument(e.to_string()))
    }
}

/// Arguments of `get_recent_traffic`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecentTrafficArgs {
    pub count: usize,
}

impl Default for RecentTrafficArgs {
    fn default() -> Self {
        Self {
            count: DEFAULT_RECENT_COUNT,
        }
    }
}

/// Arguments of `start_tracking`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartTrackingArgs {
    /// Sampling interval in seconds; the configured default when absent.
    pub interval_sec: Option<f64>,
}

/// Arguments of `get_tracking_log`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingLogArgs {
    pub limit: usize,
    pub filter_type: String,
    /// Echoed back; only the current session is held in memory.
    pub time_range: String,
}

impl Default for TrackingLogArgs {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            filter_type: "all".to_string(),
            time_range: "this_session".to_string(),
        }
    }
}

/// Arguments of `query_interaction_context`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextArgs {
    pub query_type: String,
}

impl Default for ContextArgs {
    fn default() -> Self {
        Self {
            query_type: "current_state".to_string(),
        }
    }
}

/// Arguments of `clear_data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClearArgs {
    pub clear_scope: String,
    pub confirm: bool,
}

impl Default for ClearArgs {
    fn default() -> Self {
        Self {
            clear_scope: "current_session".to_string(),
            confirm: false,
        }
    }
}

/// Arguments of `export_data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportArgs {
    /// Destination path. Required.
    pub output_file: Option<PathBuf>,
    pub export_format: String,
    pub anonymize: bool,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            output_file: None,
            export_format: "json".to_string(),
            anonymize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_minimal_call() {
        let call: ToolCall = serde_json::from_str(r#"{"tool": "take_snapshot"}"#).unwrap();
        assert_eq!(call.tool, "take_snapshot");
        assert!(call.id.is_none());
        assert!(call.arguments.is_null());
    }

    #[test]
    fn parse_call_with_id_and_arguments() {
        let line = r#"{"id": 7, "tool": "get_recent_traffic", "arguments": {"count": 3}}"#;
        let call: ToolCall = serde_json::from_str(line).unwrap();
        assert_eq!(call.id, Some(json!(7)));
        assert_eq!(call.args::<RecentTrafficArgs>().unwrap().count, 3);
    }

    #[test]
    fn missing_arguments_use_defaults() {
        let call = ToolCall::new("get_tracking_log", Value::Null);
        let args: TrackingLogArgs = call.args().unwrap();
        assert_eq!(args.limit, 10);
        assert_eq!(args.filter_type, "all");
        assert_eq!(args.time_range, "this_session");

        let args: ExportArgs = ToolCall::new("export_data", json!({})).args().unwrap();
        assert!(args.anonymize);
        assert_eq!(args.export_format, "json");
        assert!(args.output_file.is_none());
    }

    #[test]
    fn partial_arguments_keep_other_defaults() {
        let call = ToolCall::new("clear_data", json!({"confirm": true}));
        let args: ClearArgs = call.args().unwrap();
        assert!(args.confirm);
        assert_eq!(args.clear_scope, "current_session");
    }

    #[test]
    fn wrong_shape_is_invalid_argument() {
        let call = ToolCall::new("get_recent_traffic", json!({"count": "many"}));
        assert!(matches!(
            call.args::<RecentTrafficArgs>(),
            Err(Error::InvalidArgument(_))
        ));

        let call = ToolCall::new("get_recent_traffic", json!({"count": -1}));
        assert!(call.args::<RecentTrafficArgs>().is_err());
    }
}
