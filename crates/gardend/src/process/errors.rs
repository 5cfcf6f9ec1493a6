//! Defines the unified error surface for daemon launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::server::ServerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed before the server was started.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The server failed to start or stop.
    #[error("daemon server failed: {0}")]
    Server(#[from] ServerError),
    /// Waiting for a termination signal failed.
    #[error("shutdown listener failed: {0}")]
    Shutdown(#[from] ShutdownError),
}
