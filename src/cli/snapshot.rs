//! `emacs-tracker snapshot` command implementation.

use crate::cli::open_tracker;
use crate::config::Config;
use crate::error::Result;
use crate::tools::{ToolCall, dispatch_tool};
use serde_json::Value;

/// Take one snapshot and print the response envelope.
///
/// A failed snapshot is still printed as a failure envelope.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or output fails.
pub async fn run(config: &Config, socket: Option<&str>) -> Result<()> {
    let tracker = open_tracker(config, socket)?;
    let response = dispatch_tool(&ToolCall::new("take_snapshot", Value::Null), &tracker).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
