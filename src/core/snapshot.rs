//! Snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped capture of editor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the capture was composed.
    pub timestamp: DateTime<Utc>,

    /// Facts about the selected window's buffer.
    pub buffer: BufferFacts,

    /// Point, line and column in that buffer.
    pub cursor: CursorFacts,

    /// Change summary against the previous capture of the same buffer.
    pub content: ContentDiff,

    /// Recently executed commands.
    pub commands: CommandFacts,

    /// Frame-level facts.
    pub environment: EnvironmentFacts,

    /// Append order within the session, starting at 0.
    ///
    /// Assigned by the session buffer; evicted snapshots keep theirs.
    pub sequence_position: u64,
}

/// Buffer-level facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferFacts {
    /// Buffer name.
    pub name: String,

    /// Visited file, if any.
    pub file: Option<String>,

    /// Major mode name.
    pub mode: String,

    /// Unsaved changes present.
    pub modified: bool,

    /// Size in characters.
    pub size: u64,
}

/// Cursor facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorFacts {
    /// Absolute position of point.
    pub position: u64,

    /// 1-based line number.
    pub line: u64,

    /// 0-based column.
    pub column: u64,
}

/// Content change summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDiff {
    /// First 8 hex characters of the content digest.
    pub content_hash: String,

    /// Inserted plus deleted lines against the previous text.
    pub diff_lines: usize,

    /// The text differs from the previous capture.
    pub has_changes: bool,

    /// Leading part of the text, with `...` when cut.
    pub content_preview: String,
}

/// Command facts. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFacts {
    /// Previous command.
    pub last_command: Option<String>,

    /// Command being executed.
    pub this_command: Option<String>,
}

/// Environment facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFacts {
    /// Windows in the selected frame.
    pub window_count: u32,
}

/// Everything gathered from the editor for one snapshot, before diffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorFacts {
    /// Buffer facts.
    pub buffer: BufferFacts,

    /// Cursor facts.
    pub cursor: CursorFacts,

    /// Command facts.
    pub commands: CommandFacts,

    /// Environment facts.
    pub environment: EnvironmentFacts,

    /// Full buffer text, used only for the diff.
    pub text: String,
}

impl Snapshot {
    /// Compose a snapshot. The sequence position is set when appended.
    #[must_use]
    pub fn compose(facts: EditorFacts, content: ContentDiff, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            buffer: facts.buffer,
            cursor: facts.cursor,
            content,
            commands: facts.commands,
            environment: facts.environment,
            sequence_position: 0,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_facts(name: &str, text: &str) -> EditorFacts {
    EditorFacts {
        buffer: BufferFacts {
            name: name.to_string(),
            file: None,
            mode: "fundamental-mode".to_string(),
            modified: false,
            size: text.chars().count() as u64,
        },
        cursor: CursorFacts {
            position: 1,
            line: 1,
            column: 0,
        },
        commands: CommandFacts::default(),
        environment: EnvironmentFacts { window_count: 1 },
        text: text.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample_snapshot(name: &str) -> Snapshot {
    let content = ContentDiff {
        content_hash: "00000000".to_string(),
        diff_lines: 0,
        has_changes: false,
        content_preview: String::new(),
    };
    Snapshot::compose(sample_facts(name, ""), content, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_json_shape() {
        let mut snapshot = sample_snapshot("*scratch*");
        snapshot.buffer.file = Some("/tmp/test.py".to_string());
        snapshot.commands.last_command = Some("save-buffer".to_string());

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["buffer"]["name"], json!("*scratch*"));
        assert_eq!(value["buffer"]["file"], json!("/tmp/test.py"));
        assert_eq!(value["cursor"]["line"], json!(1));
        assert_eq!(value["content"]["has_changes"], json!(false));
        assert_eq!(value["commands"]["last_command"], json!("save-buffer"));
        assert_eq!(value["commands"]["this_command"], json!(null));
        assert_eq!(value["environment"]["window_count"], json!(1));
        assert_eq!(value["sequence_position"], json!(0));
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn snapshot_deserializes_from_persisted_form() {
        let snapshot = sample_snapshot("notes.org");
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
