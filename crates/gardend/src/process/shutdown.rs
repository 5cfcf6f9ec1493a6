//! Blocking wait for the signal that ends the serving phase.
//!
//! Once [`ShutdownSignal::wait`] returns, the launch sequence stops the
//! server: the socket file is removed and open connections finish their
//! current request before their threads are joined.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Signals that end the serving phase.
const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the stop request that precedes draining the server.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks the launch thread until the server should be stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be set
    /// up. The caller still stops the server before reporting it.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Failures while arming the stop request.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the termination signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new(TERMINATION_SIGNALS)
            .map_err(|source| ShutdownError::Install { source })?;
        let received = signals.forever().next();
        info!(
            target: PROCESS_TARGET,
            signal = ?received,
            "termination requested; draining daemon server"
        );
        Ok(())
    }
}
