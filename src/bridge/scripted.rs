//! In-memory bridge with canned answers, for tests and dry runs.

use super::{EvalBridge, NIL};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Bridge answering from a fixed table instead of a live editor.
///
/// Each entry pairs a fragment with a response; the first entry whose
/// fragment occurs in the expression wins. Unmatched expressions get
/// [`NIL`], like an unreachable editor would.
#[derive(Debug, Default)]
pub struct ScriptedBridge {
    responses: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
    connected: AtomicBool,
}

impl ScriptedBridge {
    /// Create a bridge that answers `nil` to everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `response` to any expression containing `fragment`.
    #[must_use]
    pub fn with_response(mut self, fragment: &str, response: &str) -> Self {
        self.responses
            .push((fragment.to_string(), response.to_string()));
        self
    }

    /// Expressions evaluated so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EvalBridge for ScriptedBridge {
    async fn evaluate_on(&self, expression: &str, _target: Option<&str>) -> String {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(expression.to_string());

        let response = self
            .responses
            .iter()
            .find(|(fragment, _)| expression.contains(fragment.as_str()))
            .map_or_else(|| NIL.to_string(), |(_, r)| r.clone());

        self.connected.store(response != NIL, Ordering::Relaxed);
        response
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
