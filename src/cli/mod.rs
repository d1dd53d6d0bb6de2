//! CLI command implementations.

pub mod clean;
pub mod list;
pub mod serve;
pub mod snapshot;
pub mod status;

use crate::bridge::{EmacsClient, EvalBridge};
use crate::config::Config;
use crate::core::Tracker;
use crate::error::Result;
use crate::storage::FileBackend;
use std::sync::Arc;

/// Bridge for the configured editor, with `socket` overriding the config.
#[must_use]
pub fn open_bridge(config: &Config, socket: Option<&str>) -> Arc<dyn EvalBridge> {
    let mut emacs = config.emacs.clone();
    if let Some(socket) = socket {
        emacs.socket_name = Some(socket.to_string());
    }
    Arc::new(EmacsClient::from_config(&emacs))
}

/// File backend at the configured storage path.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created.
pub fn open_store(config: &Config) -> Result<Arc<FileBackend>> {
    Ok(Arc::new(FileBackend::new(config.storage.path.clone())?))
}

/// Tracker wired to the live editor and the file backend.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created.
pub fn open_tracker(config: &Config, socket: Option<&str>) -> Result<Tracker> {
    Ok(Tracker::new(
        open_bridge(config, socket),
        open_store(config)?,
        config.tracking.clone(),
    ))
}
