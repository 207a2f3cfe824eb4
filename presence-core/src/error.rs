use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures surfaced synchronously while building an engine or its backend.
#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("probe backend `{tool}` not available: {source}")]
    BackendUnavailable {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("probe backend path is not an executable file: {}", .0.display())]
    InvalidBackendPath(PathBuf),
}

/// A single probe attempt that could not determine presence.
///
/// The scan dispatcher never propagates these; they are logged and the
/// identifier is treated as absent for the current cycle.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error while probing {identifier}: {source}")]
    Io {
        identifier: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe for {identifier} exited with {status}")]
    ExitStatus {
        identifier: String,
        status: ExitStatus,
    },

    #[error("probe for {identifier} cancelled")]
    Cancelled { identifier: String },

    #[error("probe backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, PresenceError>;
