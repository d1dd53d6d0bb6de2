//! Tool response envelope.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error text used when a failure carries no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Uniform `{success, result?, error?}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,

    /// Payload, omitted when there is none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    /// A successful response. Null or empty-object payloads are dropped.
    #[must_use]
    pub fn success(result: Value) -> Self {
        let empty = match &result {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        Self {
            success: true,
            result: (!empty).then_some(result),
            error: None,
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            result: None,
            error: Some(if error.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            }),
        }
    }

    /// A failed response for `error` raised while doing `action`.
    ///
    /// Tracking state violations keep their bare message.
    #[must_use]
    pub fn from_error(action: &str, error: &Error) -> Self {
        match error {
            Error::AlreadyTracking | Error::NotTracking => Self::failure(error.to_string()),
            other => Self::failure(format!("{action}: {other}")),
        }
    }
}

/// Response line written back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ToolReply {
    /// Request id, when the call carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(flatten)]
    pub response: ToolResponse,
}
