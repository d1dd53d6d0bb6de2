//! Gathers editor facts through the bridge.

use super::buffer::SessionBuffer;
use super::snapshot::{
    BufferFacts, CommandFacts, CursorFacts, EditorFacts, EnvironmentFacts, Snapshot,
};
use crate::bridge::{Atom, EvalBridge, NIL, decode_string, parse_list, quote_string};
use crate::error::{Error, Result};
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Buffer, file, mode, point, size, line, column, modified flag.
pub const BUFFER_INFO_EXPRESSION: &str = "\
(let ((buf (window-buffer (selected-window))))
  (with-current-buffer buf
    (list (buffer-name buf)
          (buffer-file-name buf)
          (symbol-name major-mode)
          (point)
          (buffer-size)
          (line-number-at-pos)
          (current-column)
          (buffer-modified-p))))";

/// Name of the previous command.
pub const LAST_COMMAND_EXPRESSION: &str = "(symbol-name last-command)";

/// Name of the current command.
pub const THIS_COMMAND_EXPRESSION: &str = "(symbol-name this-command)";

/// Windows in the selected frame.
pub const WINDOW_COUNT_EXPRESSION: &str = "(length (window-list))";

const BUFFER_INFO_FIELDS: usize = 8;

/// Expression returning the full text of `buffer_name`.
#[must_use]
pub fn buffer_text_expression(buffer_name: &str) -> String {
    format!(
        "(with-current-buffer {} (buffer-string))",
        quote_string(buffer_name)
    )
}

/// Issues the fixed sequence of bridge calls for one snapshot.
#[derive(Clone)]
pub struct SnapshotAssembler {
    bridge: Arc<dyn EvalBridge>,
}

impl SnapshotAssembler {
    /// Create an assembler over `bridge`.
    #[must_use]
    pub fn new(bridge: Arc<dyn EvalBridge>) -> Self {
        Self { bridge }
    }

    /// Collect facts and append the resulting snapshot to `session`.
    ///
    /// The lock is taken only after every round-trip has completed, so
    /// append order is completion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer info response cannot be composed.
    pub async fn assemble(&self, session: &Mutex<SessionBuffer>) -> Result<Snapshot> {
        let facts = self.collect().await?;
        let mut buffer = session.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(buffer.record(facts, Utc::now()))
    }

    /// Run the round-trips without touching any session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer info response cannot be composed.
    pub async fn collect(&self) -> Result<EditorFacts> {
        let (buffer, cursor) = self.buffer_info().await?;
        let commands = self.command_info().await;
        let window_count = self.window_count().await;
        let text = self.buffer_text(&buffer.name).await;

        debug!(
            buffer = %buffer.name,
            line = cursor.line,
            column = cursor.column,
            "collected editor facts"
        );

        Ok(EditorFacts {
            buffer,
            cursor,
            commands,
            environment: EnvironmentFacts { window_count },
            text,
        })
    }

    async fn buffer_info(&self) -> Result<(BufferFacts, CursorFacts)> {
        let raw = self.bridge.evaluate(BUFFER_INFO_EXPRESSION).await;
        compose_buffer_info(&parse_list(&raw))
    }

    async fn command_info(&self) -> CommandFacts {
        let last = self.bridge.evaluate(LAST_COMMAND_EXPRESSION).await;
        let this = self.bridge.evaluate(THIS_COMMAND_EXPRESSION).await;

        CommandFacts {
            last_command: command_name(&last),
            this_command: command_name(&this),
        }
    }

    async fn window_count(&self) -> u32 {
        let raw = self.bridge.evaluate(WINDOW_COUNT_EXPRESSION).await;
        parse_window_count(&raw)
    }

    async fn buffer_text(&self, buffer_name: &str) -> String {
        let raw = self
            .bridge
            .evaluate(&buffer_text_expression(buffer_name))
            .await;
        if raw == NIL {
            String::new()
        } else {
            decode_string(&raw)
        }
    }
}

/// Destructure the 8-element buffer info list.
fn compose_buffer_info(fields: &[Atom]) -> Result<(BufferFacts, CursorFacts)> {
    let [name, file, mode, position, size, line, column, modified] = fields else {
        return Err(Error::MalformedResponse(format!(
            "expected {BUFFER_INFO_FIELDS} buffer fields, got {}",
            fields.len()
        )));
    };

    let name = name
        .as_text()
        .ok_or_else(|| Error::MalformedResponse(format!("buffer name: {name:?}")))?
        .to_string();
    let file = match file {
        Atom::Nil => None,
        other => Some(
            other
                .as_text()
                .ok_or_else(|| Error::MalformedResponse(format!("buffer file: {other:?}")))?
                .to_string(),
        ),
    };
    let mode = mode
        .as_text()
        .ok_or_else(|| Error::MalformedResponse(format!("major mode: {mode:?}")))?
        .to_string();

    let buffer = BufferFacts {
        name,
        file,
        mode,
        modified: modified.is_truthy(),
        size: number(size, "buffer size")?,
    };
    let cursor = CursorFacts {
        position: number(position, "point")?,
        line: number(line, "line number")?,
        column: number(column, "column")?,
    };

    Ok((buffer, cursor))
}

fn number(atom: &Atom, what: &str) -> Result<u64> {
    atom.as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| Error::MalformedResponse(format!("{what}: {atom:?}")))
}

/// Dequoted command name, or `None` for `nil`.
fn command_name(raw: &str) -> Option<String> {
    if raw == NIL || raw.is_empty() {
        None
    } else {
        Some(raw.trim_matches('"').to_string())
    }
}

/// Window count, defaulting to 1 when the answer is not a number.
fn parse_window_count(raw: &str) -> u32 {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse().unwrap_or(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ScriptedBridge;

    const BUFFER_INFO: &str = r#"("*scratch*" "/tmp/test.py" "python-mode" 123 456 10 5 t)"#;

    fn scripted() -> ScriptedBridge {
        ScriptedBridge::new()
            .with_response("buffer-modified-p", BUFFER_INFO)
            .with_response("last-command", "\"next-line\"")
            .with_response("this-command", "\"self-insert-command\"")
            .with_response("window-list", "3")
            .with_response("buffer-string", "\"hello\"")
    }

    #[tokio::test]
    async fn collects_all_facts() {
        let assembler = SnapshotAssembler::new(Arc::new(scripted()));
        let facts = assembler.collect().await.unwrap();

        assert_eq!(facts.buffer.name, "*scratch*");
        assert_eq!(facts.buffer.file.as_deref(), Some("/tmp/test.py"));
        assert_eq!(facts.buffer.mode, "python-mode");
        assert!(facts.buffer.modified);
        assert_eq!(facts.buffer.size, 456);
        assert_eq!(facts.cursor.position, 123);
        assert_eq!(facts.cursor.line, 10);
        assert_eq!(facts.cursor.column, 5);
        assert_eq!(facts.commands.last_command.as_deref(), Some("next-line"));
        assert_eq!(
            facts.commands.this_command.as_deref(),
            Some("self-insert-command")
        );
        assert_eq!(facts.environment.window_count, 3);
        assert_eq!(facts.text, "hello");
    }

    #[tokio::test]
    async fn issues_calls_in_fixed_order() {
        let bridge = Arc::new(scripted());
        let assembler = SnapshotAssembler::new(bridge.clone());
        assembler.collect().await.unwrap();

        let calls = bridge.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], BUFFER_INFO_EXPRESSION);
        assert_eq!(calls[1], LAST_COMMAND_EXPRESSION);
        assert_eq!(calls[2], THIS_COMMAND_EXPRESSION);
        assert_eq!(calls[3], WINDOW_COUNT_EXPRESSION);
        assert_eq!(calls[4], r#"(with-current-buffer "*scratch*" (buffer-string))"#);
    }

    #[tokio::test]
    async fn unreachable_editor_is_malformed() {
        let assembler = SnapshotAssembler::new(Arc::new(ScriptedBridge::new()));
        let result = assembler.collect().await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn missing_optional_facts_use_defaults() {
        let bridge = ScriptedBridge::new()
            .with_response("buffer-modified-p", r#"("notes" nil "org-mode" 1 0 1 0 nil)"#)
            .with_response("window-list", "not-a-number");
        let assembler = SnapshotAssembler::new(Arc::new(bridge));
        let facts = assembler.collect().await.unwrap();

        assert!(facts.buffer.file.is_none());
        assert!(!facts.buffer.modified);
        assert!(facts.commands.last_command.is_none());
        assert!(facts.commands.this_command.is_none());
        assert_eq!(facts.environment.window_count, 1);
        assert_eq!(facts.text, "");
    }

    #[tokio::test]
    async fn assemble_appends_to_session() {
        let assembler = SnapshotAssembler::new(Arc::new(scripted()));
        let session = Mutex::new(SessionBuffer::new());

        let first = assembler.assemble(&session).await.unwrap();
        let second = assembler.assemble(&session).await.unwrap();

        assert_eq!(first.sequence_position, 0);
        assert_eq!(second.sequence_position, 1);
        assert!(!second.content.has_changes);
        assert_eq!(session.lock().unwrap().len(), 2);
    }

    #[test]
    fn non_numeric_cursor_field_is_malformed() {
        let fields = parse_list(r#"("a" nil "m" x 1 1 1 nil)"#);
        assert!(matches!(
            compose_buffer_info(&fields),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn short_list_is_malformed() {
        let fields = parse_list(r#"("a" nil "m")"#);
        assert!(compose_buffer_info(&fields).is_err());
    }

    #[test]
    fn buffer_names_are_escaped_in_expressions() {
        assert_eq!(
            buffer_text_expression(r#"odd "name""#),
            r#"(with-current-buffer "odd \"name\"" (buffer-string))"#
        );
    }

    #[test]
    fn window_count_parsing() {
        assert_eq!(parse_window_count("2"), 2);
        assert_eq!(parse_window_count("nil"), 1);
        assert_eq!(parse_window_count(""), 1);
    }
}
