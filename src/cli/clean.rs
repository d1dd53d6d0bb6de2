//! `emacs-tracker clean` command implementation.

use crate::cli::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::storage::SessionLog;

/// Run the clean command.
///
/// Removes the persisted session log.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let removed = clean_log(store.as_ref())?;

    if removed == 0 {
        println!("No sessions to clean.");
    } else {
        println!("Cleaned {removed} session record(s).");
    }

    Ok(())
}

/// Drop every record, returning how many there were.
///
/// An unreadable log is removed as well and counts as zero records.
fn clean_log(store: &dyn SessionLog) -> Result<usize> {
    let removed = store.load().map_or(0, |records| records.len());
    store.clear()?;
    Ok(removed)
}
