//! `emacsclient` subprocess bridge.

use super::{EvalBridge, NIL};
use crate::config::EmacsConfig;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variable naming the server socket.
pub const SOCKET_ENV_VAR: &str = "EMACS_SOCKET_NAME";

/// Socket used when nothing else names one.
pub const FALLBACK_SOCKET: &str = "/tmp/emacs1000/server";

/// Pick the target: explicit, then instance default, then environment, then fallback.
#[must_use]
pub fn resolve_target(
    explicit: Option<&str>,
    instance_default: Option<&str>,
    from_env: Option<String>,
) -> String {
    explicit
        .filter(|s| !s.is_empty())
        .or(instance_default.filter(|s| !s.is_empty()))
        .map(str::to_string)
        .or(from_env.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_SOCKET.to_string())
}

/// Client for evaluating expressions via `emacsclient --eval`.
#[derive(Debug)]
pub struct EmacsClient {
    /// Path to the evaluation program.
    program: String,
    /// Instance default target.
    socket_name: Option<String>,
    /// Bound for a single round-trip.
    timeout: Duration,
    /// Outcome of the most recent call.
    connected: AtomicBool,
}

impl EmacsClient {
    /// Create a client for `emacsclient` with the default 5 second bound.
    #[must_use]
    pub fn new(socket_name: Option<String>) -> Self {
        Self::from_config(&EmacsConfig {
            socket_name,
            ..EmacsConfig::default()
        })
    }

    /// Create a client from the `[emacs]` config section.
    #[must_use]
    pub fn from_config(config: &EmacsConfig) -> Self {
        Self {
            program: config.program.clone(),
            socket_name: config.socket_name.clone(),
            timeout: config.timeout(),
            connected: AtomicBool::new(false),
        }
    }

    /// Instance default target, if configured.
    #[must_use]
    pub fn socket_name(&self) -> Option<&str> {
        self.socket_name.as_deref()
    }

    fn target(&self, explicit: Option<&str>) -> String {
        resolve_target(
            explicit,
            self.socket_name.as_deref(),
            std::env::var(SOCKET_ENV_VAR).ok(),
        )
    }

    /// Run one round-trip. `None` means the call failed in some way.
    async fn run(&self, expression: &str, target: &str) -> Option<String> {
        let child = Command::new(&self.program)
            .args(["--socket-name", target, "--eval", expression])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to spawn {}: {e}", self.program);
                return None;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("{} failed: {e}", self.program);
                return None;
            }
            Err(_) => {
                warn!(
                    "{} timed out after {:?} evaluating {expression}",
                    self.program, self.timeout
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for EmacsClient {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl EvalBridge for EmacsClient {
    async fn evaluate_on(&self, expression: &str, target: Option<&str>) -> String {
        let target = self.target(target);
        match self.run(expression, &target).await {
            Some(out) => {
                self.connected.store(true, Ordering::Relaxed);
                out
            }
            None => {
                self.connected.store(false, Ordering::Relaxed);
                NIL.to_string()
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn default_target(&self) -> Option<String> {
        Some(self.target(None))
    }
}
