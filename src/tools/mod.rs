//! Tool calls: request parsing, dispatch and the response envelope.

pub mod input;
pub mod output;
pub mod runner;
pub mod stdio;

pub use input::ToolCall;
pub use output::{ToolReply, ToolResponse};
pub use runner::{Tool, dispatch_tool};
pub use stdio::{handle_line, serve};
