//! Presence probe capability and the bundled backends.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

pub mod hcitool;

pub use hcitool::HciTool;

/// Determines whether a single identifier is currently in range.
///
/// Implementations should observe `cancel` and give up promptly once it
/// fires; the engine passes the scan's token through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceProbe: Send + Sync {
    async fn is_present(
        &self,
        cancel: &CancellationToken,
        identifier: &str,
    ) -> Result<bool, ProbeError>;
}
