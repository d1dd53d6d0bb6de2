//! `emacs-tracker serve` command implementation.

use crate::cli::open_tracker;
use crate::config::Config;
use crate::error::Result;
use crate::tools;
use tokio::io::{self, BufReader};
use tracing::info;

/// Run the tool server over stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or stdio fails.
pub async fn run(config: &Config, socket: Option<&str>) -> Result<()> {
    let tracker = open_tracker(config, socket)?;
    info!(
        "serving tool calls on stdio, log at {}",
        config.storage.path.display()
    );

    let answered = tools::serve(&tracker, BufReader::new(io::stdin()), io::stdout()).await?;
    info!("answered {answered} request(s)");
    Ok(())
}
