//! Export of the session sequence to a standalone JSON or CSV file.

use super::buffer::SessionBuffer;
use super::report::ExportFormat;
use super::snapshot::Snapshot;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Replacement for file paths in anonymized exports.
pub const ANONYMIZED_FILE: &str = "anonymized_file_path";

/// Settings echoed into the document.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub anonymized: bool,
}

/// One CSV line per snapshot, with nested facts flattened.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    sequence_position: u64,
    timestamp: DateTime<Utc>,
    buffer_name: &'a str,
    buffer_file: Option<&'a str>,
    buffer_mode: &'a str,
    buffer_modified: bool,
    buffer_size: u64,
    cursor_position: u64,
    cursor_line: u64,
    cursor_column: u64,
    content_hash: &'a str,
    diff_lines: usize,
    has_changes: bool,
    last_command: Option<&'a str>,
    this_command: Option<&'a str>,
    window_count: u32,
}

impl<'a> From<&'a Snapshot> for CsvRow<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            sequence_position: snapshot.sequence_position,
            timestamp: snapshot.timestamp,
            buffer_name: &snapshot.buffer.name,
            buffer_file: snapshot.buffer.file.as_deref(),
            buffer_mode: &snapshot.buffer.mode,
            buffer_modified: snapshot.buffer.modified,
            buffer_size: snapshot.buffer.size,
            cursor_position: snapshot.cursor.position,
            cursor_line: snapshot.cursor.line,
            cursor_column: snapshot.cursor.column,
            content_hash: &snapshot.content.content_hash,
            diff_lines: snapshot.content.diff_lines,
            has_changes: snapshot.content.has_changes,
            last_command: snapshot.commands.last_command.as_deref(),
            this_command: snapshot.commands.this_command.as_deref(),
            window_count: snapshot.environment.window_count,
        }
    }
}

/// Top-level export document.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub export_timestamp: DateTime<Utc>,
    pub session_start: DateTime<Utc>,
    pub total_interactions: usize,
    pub interactions: Vec<Snapshot>,
    pub export_settings: ExportSettings,
}

impl ExportDocument {
    /// Copy the whole sequence out of `buffer`.
    #[must_use]
    pub fn build(
        buffer: &SessionBuffer,
        format: ExportFormat,
        anonymize: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let mut interactions: Vec<Snapshot> = buffer.iter().cloned().collect();
        if anonymize {
            for snapshot in &mut interactions {
                if snapshot.buffer.file.is_some() {
                    snapshot.buffer.file = Some(ANONYMIZED_FILE.to_string());
                }
            }
        }

        Self {
            export_timestamp: now,
            session_start: buffer.started_at(),
            total_interactions: interactions.len(),
            interactions,
            export_settings: ExportSettings {
                format,
                anonymized: anonymize,
            },
        }
    }

    /// Write the document in its format, creating parent directories.
    ///
    /// JSON writes the whole document pretty-printed. CSV writes a header
    /// and one row per interaction; previews are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        match self.export_settings.format {
            ExportFormat::Json => {
                let contents = serde_json::to_string_pretty(self)?;
                fs::write(path, contents)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                for snapshot in &self.interactions {
                    writer.serialize(CsvRow::from(snapshot))?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }
}
