//! Scenario world driving a real [`Server`] over its Unix socket.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::Arc;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use garden_protocol::{Client, ClientError, MessageType, Request, Response};

use crate::server::{Server, ServerError};

use super::FakeBackend;

/// State shared across the steps of one server scenario.
pub struct ServerWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    socket_path: Utf8PathBuf,
    pub backend: Arc<FakeBackend>,
    server: Option<Server>,
    start_error: Option<ServerError>,
    client: Option<Client<UnixStream>>,
    last_outcome: Option<Result<Response, ClientError>>,
}

impl ServerWorld {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create socket directory");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temporary directory was not valid UTF-8");
        let socket_path = root.join("garden.sock");
        Self {
            _dir: dir,
            root,
            socket_path,
            backend: Arc::new(FakeBackend::default()),
            server: None,
            start_error: None,
            client: None,
            last_outcome: None,
        }
    }

    /// Replaces the socket directory with a regular file.
    pub fn block_socket_directory(&mut self) {
        let blocker = self.root.join("blocker");
        std::fs::write(&blocker, b"").expect("write blocking file");
        self.socket_path = blocker.join("garden.sock");
    }

    pub fn start(&mut self) {
        let mut server = Server::new(
            &self.socket_path,
            Arc::clone(&self.backend) as Arc<dyn crate::backend::Backend>,
        );
        match server.start() {
            Ok(()) => self.server = Some(server),
            Err(error) => self.start_error = Some(error),
        }
    }

    pub fn start_error(&self) -> Option<&ServerError> {
        self.start_error.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.server.as_ref().is_some_and(Server::is_running)
    }

    pub fn socket_path(&self) -> &Utf8PathBuf {
        &self.socket_path
    }

    fn client(&mut self) -> &mut Client<UnixStream> {
        let path = self.socket_path.clone();
        self.client
            .get_or_insert_with(|| Client::connect(&path).expect("connect to daemon"))
    }

    /// Sends `request` on the scenario's connection and records the outcome.
    pub fn call(&mut self, request: impl Into<Request>) {
        let outcome = self.client().call(request);
        self.last_outcome = Some(outcome);
    }

    /// Writes an empty frame carrying a raw discriminator.
    pub fn send_raw_frame(&mut self, code: u32) {
        let mut frame = 4_u32.to_be_bytes().to_vec();
        frame.extend_from_slice(&code.to_be_bytes());
        self.client()
            .get_mut()
            .write_all(&frame)
            .expect("write raw frame");
        let outcome = self.client().receive();
        self.last_outcome = Some(outcome);
    }

    pub fn last_response(&self) -> &Response {
        match self.last_outcome.as_ref().expect("no request was sent") {
            Ok(response) => response,
            Err(error) => panic!("request failed: {error}"),
        }
    }

    pub fn last_error(&self) -> &ClientError {
        match self.last_outcome.as_ref().expect("no request was sent") {
            Ok(response) => panic!(
                "expected a failure, got a {} response",
                response.message_type()
            ),
            Err(error) => error,
        }
    }

    pub fn last_message_type(&self) -> MessageType {
        self.last_response().message_type()
    }
}

impl Drop for ServerWorld {
    fn drop(&mut self) {
        self.client = None;
        if let Some(mut server) = self.server.take() {
            let _ = server.stop();
        }
    }
}
