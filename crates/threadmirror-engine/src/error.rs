//! Engine error types.

use crate::transport::TransportError;
use std::io;
use thiserror::Error;

/// Errors that can occur while running the replication engine.
///
/// Per-message failures (dropped deliveries, failed edits, unavailable
/// media) are handled inside the pipelines and never surface here; these
/// are the failures that affect the engine itself.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport failure outside a per-message pipeline.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A route worker terminated unexpectedly.
    #[error("Route worker for {0} stopped")]
    WorkerStopped(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
