//! Sequences bootstrap, serving and shutdown.

use std::sync::Arc;

use tracing::info;

use crate::backend::{Backend, InMemoryBackend};
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::server::Server;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the daemon with the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, server start-up or signal handling
/// fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
        Arc::new(InMemoryBackend::new()),
    )
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
    backend: Arc<dyn Backend>,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, Arc::clone(&reporter))?;
    let config = daemon.config();

    let mut server = Server::new(config.daemon_socket(), backend)
        .with_max_frame_bytes(config.max_frame_bytes());
    server.start()?;
    reporter.server_listening(server.socket_path());

    let waited = shutdown.wait();
    info!(target: PROCESS_TARGET, "stopping daemon server");
    server.stop()?;
    reporter.server_stopped(server.socket_path());
    waited?;

    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
