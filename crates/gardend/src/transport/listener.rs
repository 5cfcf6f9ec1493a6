//! Listener implementation for the daemon socket.

use std::fs;
use std::io;
use std::net::Shutdown;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a Unix socket path.
#[derive(Debug)]
pub(crate) struct SocketListener {
    path: Utf8PathBuf,
    listener: UnixListener,
}

impl SocketListener {
    /// Binds `path`, replacing a stale socket file left by a previous run.
    pub(crate) fn bind(path: &Utf8Path) -> Result<Self, ListenerError> {
        let listener = bind_unix(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    /// Spawns the accept loop.
    ///
    /// On failure the socket file is removed again and no thread is left
    /// running.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.listener.set_nonblocking(true) {
            cleanup_unix_socket(&self.path);
            return Err(ListenerError::NonBlocking { source });
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let path = self.path.clone();
        let spawned = thread::Builder::new()
            .name("gardend-accept".to_owned())
            .spawn(move || run_accept_loop(&self, &shutdown_flag, &handler));
        match spawned {
            Ok(handle) => Ok(ListenerHandle {
                shutdown,
                handle: Some(handle),
            }),
            Err(source) => {
                cleanup_unix_socket(&path);
                Err(ListenerError::Spawn { source })
            }
        }
    }
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop; connections are drained by [`Self::join`].
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop and every connection thread to finish.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Live connections, kept so shutdown can unblock and join them.
#[derive(Default)]
struct ConnectionTracker {
    connections: Mutex<Vec<TrackedConnection>>,
}

struct TrackedConnection {
    stream: UnixStream,
    thread: thread::JoinHandle<()>,
}

impl ConnectionTracker {
    fn track(&self, stream: UnixStream, thread: thread::JoinHandle<()>) {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        connections.retain(|connection| !connection.thread.is_finished());
        connections.push(TrackedConnection { stream, thread });
    }

    /// Closes the read half of every connection and joins its thread.
    ///
    /// Handlers finish the request they are serving, then observe end of
    /// stream on their next read.
    fn drain(&self) {
        let connections = std::mem::take(
            &mut *self
                .connections
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        for connection in &connections {
            if let Err(error) = connection.stream.shutdown(Shutdown::Read)
                && error.kind() != io::ErrorKind::NotConnected
            {
                debug!(
                    target: LISTENER_TARGET,
                    error = %error,
                    "failed to shut down connection"
                );
            }
        }
        for connection in connections {
            if connection.thread.join().is_err() {
                warn!(target: LISTENER_TARGET, "connection handler panicked");
            }
        }
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        path = %listener.path,
        "socket listener active"
    );
    let tracker = ConnectionTracker::default();
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(listener) {
            Ok(Some(stream)) => {
                last_error = None;
                spawn_connection(&tracker, stream, handler);
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    cleanup_unix_socket(&listener.path);
    tracker.drain();
    info!(
        target: LISTENER_TARGET,
        path = %listener.path,
        "socket listener stopped"
    );
}

fn spawn_connection(
    tracker: &ConnectionTracker,
    stream: UnixStream,
    handler: &Arc<dyn ConnectionHandler>,
) {
    let control = match stream.try_clone() {
        Ok(control) => control,
        Err(error) => {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "failed to clone connection; dropping it"
            );
            return;
        }
    };
    let handler = Arc::clone(handler);
    match thread::Builder::new()
        .name("gardend-conn".to_owned())
        .spawn(move || handler.handle(stream))
    {
        Ok(thread) => tracker.track(control, thread),
        Err(error) => warn!(
            target: LISTENER_TARGET,
            error = %error,
            "failed to spawn connection thread"
        ),
    }
}

fn accept_connection(listener: &SocketListener) -> Result<Option<UnixStream>, io::Error> {
    match listener.listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_unix(path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        let metadata =
            fs::symlink_metadata(path).map_err(|source| ListenerError::UnixMetadata {
                path: path.to_path_buf(),
                source,
            })?;
        if !metadata.file_type().is_socket() {
            return Err(ListenerError::UnixNotSocket {
                path: path.to_path_buf(),
            });
        }
        match UnixStream::connect(path) {
            Ok(_stream) => {
                return Err(ListenerError::UnixInUse {
                    path: path.to_path_buf(),
                });
            }
            Err(error)
                if error.kind() == io::ErrorKind::ConnectionRefused
                    || error.kind() == io::ErrorKind::NotFound =>
            {
                fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Err(error) => {
                return Err(ListenerError::UnixConnect {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        }
    }

    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.to_path_buf(),
        source,
    })
}

fn cleanup_unix_socket(path: &Utf8Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
