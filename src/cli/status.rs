//! `emacs-tracker status` command implementation.

use crate::cli::open_bridge;
use crate::config::Config;
use crate::error::Result;

/// Check the editor connection and print `{socket_exists, is_connected}`.
///
/// # Errors
///
/// Returns an error if output fails.
pub async fn run(config: &Config, socket: Option<&str>) -> Result<()> {
    let status = open_bridge(config, socket).status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
