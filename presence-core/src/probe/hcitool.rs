use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::PresenceProbe;
use crate::error::{PresenceError, ProbeError, Result};

const HCITOOL_BINARY: &str = "hcitool";

/// Probe backed by BlueZ's `hcitool name <address>`.
///
/// `hcitool` prints the remote device name when the device answers a name
/// request and prints nothing when it is out of range.
#[derive(Debug, Clone)]
pub struct HciTool {
    path: PathBuf,
}

impl HciTool {
    /// Locate `hcitool` on `PATH`.
    pub fn new() -> Result<Self> {
        Self::find_in(std::env::var_os("PATH"))
    }

    /// Locate `hcitool` in a `PATH`-style list of directories.
    pub(crate) fn find_in<P: AsRef<OsStr>>(paths: Option<P>) -> Result<Self> {
        let path = which::which_in(HCITOOL_BINARY, paths, Path::new(".")).map_err(|source| {
            PresenceError::BackendUnavailable {
                tool: HCITOOL_BINARY.to_string(),
                source,
            }
        })?;
        Ok(Self { path })
    }

    /// Use an explicit binary instead of searching `PATH`. The path must be
    /// an executable regular file.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !is_executable_file(&path) {
            return Err(PresenceError::InvalidBackendPath(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

#[async_trait]
impl PresenceProbe for HciTool {
    async fn is_present(
        &self,
        cancel: &CancellationToken,
        identifier: &str,
    ) -> std::result::Result<bool, ProbeError> {
        let mut cmd = Command::new(&self.path);
        cmd.arg("name").arg(identifier).kill_on_drop(true);

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ProbeError::Cancelled {
                    identifier: identifier.to_string(),
                });
            }
            output = cmd.output() => output.map_err(|source| ProbeError::Io {
                identifier: identifier.to_string(),
                source,
            })?,
        };

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                identifier: identifier.to_string(),
                status: output.status,
            });
        }

        let name = String::from_utf8_lossy(&output.stdout);
        let name = name.trim();
        debug!(identifier, name, "hcitool name lookup finished");
        Ok(!name.is_empty())
    }
}
