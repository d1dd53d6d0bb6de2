//! emacs-tracker - records Emacs interaction traffic.
//!
//! Samples the selected window's buffer, cursor, recent commands and
//! content changes through `emacsclient`, keeps a bounded session
//! sequence in memory and serves it to AI tools as JSON envelopes.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};
