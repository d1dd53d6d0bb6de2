//! Evaluation bridge to the running editor.
//!
//! Every call is fail-soft: transport problems come back as [`NIL`],
//! never as an error.

mod client;
mod parse;
mod scripted;

pub use client::{EmacsClient, FALLBACK_SOCKET, SOCKET_ENV_VAR, resolve_target};
pub use parse::{Atom, decode_string, parse_list, quote_string};
pub use scripted::ScriptedBridge;

use async_trait::async_trait;
use serde::Serialize;

/// Sentinel returned for "unknown or unavailable".
pub const NIL: &str = "nil";

/// Expression used for the connectivity self-check.
pub const SELF_CHECK_EXPRESSION: &str = "(+ 1 1)";

/// Expected answer to [`SELF_CHECK_EXPRESSION`].
pub const SELF_CHECK_EXPECTED: &str = "2";

/// Channel that evaluates one expression in the editor.
#[async_trait]
pub trait EvalBridge: Send + Sync {
    /// Evaluate `expression` against `target`, or the default target.
    ///
    /// Returns the trimmed printed result, or [`NIL`] on any failure.
    async fn evaluate_on(&self, expression: &str, target: Option<&str>) -> String;

    /// Whether the most recent call succeeded.
    fn is_connected(&self) -> bool;

    /// Path of the default target, when the bridge has one.
    fn default_target(&self) -> Option<String> {
        None
    }

    /// Evaluate `expression` against the default target.
    async fn evaluate(&self, expression: &str) -> String {
        self.evaluate_on(expression, None).await
    }

    /// Run the self-check and report connectivity.
    async fn status(&self) -> BridgeStatus {
        let socket_exists = self
            .default_target()
            .is_some_and(|path| std::path::Path::new(&path).exists());
        let is_connected = self.evaluate(SELF_CHECK_EXPRESSION).await == SELF_CHECK_EXPECTED;

        tracing::info!("Emacs server socket exists: {socket_exists}");
        tracing::info!("Emacs server connection active: {is_connected}");

        BridgeStatus {
            socket_exists,
            is_connected,
        }
    }
}

/// Result of [`EvalBridge::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeStatus {
    /// The default target exists on disk.
    pub socket_exists: bool,

    /// The self-check expression evaluated to the expected value.
    pub is_connected: bool,
}
