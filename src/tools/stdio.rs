//! Line-delimited JSON tool server.

use crate::core::Tracker;
use crate::error::Result;
use crate::tools::input::ToolCall;
use crate::tools::output::{ToolReply, ToolResponse};
use crate::tools::runner::dispatch_tool;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Answer one request line.
pub async fn handle_line(line: &str, tracker: &Tracker) -> ToolReply {
    match serde_json::from_str::<ToolCall>(line) {
        Ok(call) => ToolReply {
            response: dispatch_tool(&call, tracker).await,
            id: call.id,
        },
        Err(e) => ToolReply {
            id: None,
            response: ToolResponse::failure(format!("Invalid request: {e}")),
        },
    }
}

/// Serve requests from `reader` until EOF, one reply line per request.
///
/// Blank lines are skipped. At EOF an active sampling task is ended.
/// Returns the number of requests answered.
///
/// # Errors
///
/// Returns an error if reading or writing the stream fails.
pub async fn serve<R, W>(tracker: &Tracker, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = handle_line(line, tracker).await;
        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        answered += 1;
    }

    debug!("input closed after {answered} request(s)");
    tracker.shutdown().await;
    info!("tool server stopped");
    Ok(answered)
}
