//! `emacs-tracker list` command implementation.

use crate::cli::open_store;
use crate::config::Config;
use crate::core::Snapshot;
use crate::error::Result;
use crate::storage::{SessionLog, SessionRecord};
use chrono::{DateTime, Local, Utc};

/// Default number of records to show.
const DEFAULT_LIMIT: usize = 20;

/// Maximum length for the buffer column.
const BUFFER_PREVIEW_LEN: usize = 30;

/// Run the list command.
///
/// Shows persisted session records, newest first.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = open_store(config)?;
    let records = newest_first(store.as_ref(), limit.unwrap_or(DEFAULT_LIMIT))?;

    if records.is_empty() {
        println!("No sessions found.");
        println!("\nSessions are stored in: {}", store.log_path().display());
        return Ok(());
    }

    println!(
        "{:<34} {:<17} {:>6} Last Buffer",
        "Session ID", "Saved", "Shots"
    );
    println!("{}", "─".repeat(90));

    for record in &records {
        println!(
            "{:<34} {:<17} {:>6} {}",
            record.session_id,
            format_local_time(record.timestamp),
            record.interactions.len(),
            last_buffer(&record.interactions)
        );
    }

    println!("{}", "─".repeat(90));
    println!("Showing {} record(s)", records.len());

    Ok(())
}

/// Load at most `limit` records, newest first.
fn newest_first(store: &dyn SessionLog, limit: usize) -> Result<Vec<SessionRecord>> {
    let mut records = store.load()?;
    records.reverse();
    records.truncate(limit);
    Ok(records)
}

/// Format UTC time as local time for display.
fn format_local_time(utc: DateTime<Utc>) -> String {
    let local: DateTime<Local> = utc.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// Name of the buffer in the newest interaction, truncated.
fn last_buffer(interactions: &[Snapshot]) -> String {
    match interactions.last() {
        Some(snapshot) => {
            let name = &snapshot.buffer.name;
            if name.chars().count() > BUFFER_PREVIEW_LEN {
                let cut: String = name.chars().take(BUFFER_PREVIEW_LEN).collect();
                format!("{cut}...")
            } else {
                name.clone()
            }
        }
        None => "(no interactions)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::sample_snapshot;
    use crate::storage::MemoryBackend;

    fn record(session_id: &str, buffer: Option<&str>) -> SessionRecord {
        SessionRecord {
            session_id: session_id.to_string(),
            interactions: buffer.map(sample_snapshot).into_iter().collect(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn list_empty_store() {
        let store = MemoryBackend::new();
        assert!(newest_first(&store, 10).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let store = MemoryBackend::new();
        let records: Vec<_> = (0..5)
            .map(|i| record(&format!("session-{i}"), None))
            .collect();
        store.save(&records).unwrap();

        let listed = newest_first(&store, 3).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].session_id, "session-4");
        assert_eq!(listed[2].session_id, "session-2");
    }

    #[test]
    fn last_buffer_truncates_long_names() {
        let long = "x".repeat(100);
        let preview = last_buffer(&record("s", Some(&long)).interactions);
        assert!(preview.len() < 40);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn last_buffer_handles_empty_record() {
        assert_eq!(last_buffer(&[]), "(no interactions)");
        assert_eq!(
            last_buffer(&record("s", Some("*scratch*")).interactions),
            "*scratch*"
        );
    }
}
