//! Start/stop lifecycle around the socket listener.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::warn;

use garden_protocol::DEFAULT_MAX_FRAME_BYTES;

use crate::backend::Backend;
use crate::dispatch::{DispatchConnectionHandler, Dispatcher};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors surfaced by [`Server::start`] and [`Server::stop`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start` was called on a running server.
    #[error("server is already started")]
    AlreadyStarted,
    /// Binding or running the listener failed.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Daemon front end serving one socket path with one backend.
///
/// The server owns no container state: every request is forwarded to the
/// injected [`Backend`].
pub struct Server {
    socket_path: Utf8PathBuf,
    backend: Arc<dyn Backend>,
    max_frame_bytes: u32,
    listener: Option<ListenerHandle>,
}

impl Server {
    /// Builds an unstarted server.
    #[must_use]
    pub fn new(socket_path: impl Into<Utf8PathBuf>, backend: Arc<dyn Backend>) -> Self {
        Self {
            socket_path: socket_path.into(),
            backend,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            listener: None,
        }
    }

    /// Overrides the largest request frame connections accept.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Socket path the server binds.
    #[must_use]
    pub fn socket_path(&self) -> &Utf8Path {
        &self.socket_path
    }

    /// Returns `true` between a successful [`Self::start`] and [`Self::stop`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Binds the socket and starts accepting connections.
    ///
    /// Binding happens on the calling thread, so a bad path is reported here
    /// and nothing is left running.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyStarted`] when called twice, or
    /// [`ServerError::Listener`] when the socket cannot be bound.
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.listener.is_some() {
            return Err(ServerError::AlreadyStarted);
        }
        let listener = SocketListener::bind(&self.socket_path)?;
        let dispatcher = Dispatcher::new(Arc::clone(&self.backend));
        let handler = Arc::new(DispatchConnectionHandler::new(
            dispatcher,
            self.max_frame_bytes,
        ));
        self.listener = Some(listener.start(handler)?);
        Ok(())
    }

    /// Stops accepting, removes the socket file and waits for connection
    /// threads to finish their current request.
    ///
    /// Stopping a server that is not running does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listener`] when the listener thread panicked.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };
        listener.shutdown();
        listener.join()?;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(target: SERVER_TARGET, %error, "server stopped uncleanly");
        }
    }
}
