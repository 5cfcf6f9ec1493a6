//! Blocking client for the daemon socket.

use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::codec::{Request, Response};
use crate::frame::{FrameCodec, FramingError};
use crate::messages::{
    CreateRequest, CreateResponse, DestroyRequest, EchoRequest, InfoRequest, InfoResponse,
    ListRequest, PingRequest,
};
use crate::MessageType;

/// Errors surfaced by [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon socket could not be reached.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        /// Socket path that was dialled.
        path: PathBuf,
        /// Underlying connect error.
        #[source]
        source: io::Error,
    },
    /// A frame could not be written or read.
    #[error(transparent)]
    Framing(#[from] FramingError),
    /// The daemon closed the connection before replying.
    #[error("daemon closed the connection before responding")]
    Closed,
    /// The daemon answered with an error envelope.
    #[error("{message}")]
    Server {
        /// Message carried by the envelope.
        message: String,
    },
    /// The daemon answered with a response of the wrong type.
    #[error("expected a {expected} response, received {actual}")]
    UnexpectedResponse {
        /// Type matching the request.
        expected: MessageType,
        /// Type actually received.
        actual: MessageType,
    },
}

/// One connection to the daemon; requests are answered strictly in order.
#[derive(Debug)]
pub struct Client<S> {
    stream: S,
    codec: FrameCodec,
}

#[cfg(unix)]
impl Client<UnixStream> {
    /// Connects to the daemon listening on `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] when the socket cannot be reached.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| ClientError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(stream))
    }
}

impl<S> Client<S>
where
    S: Read + Write,
{
    /// Wraps an already connected stream.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            codec: FrameCodec::default(),
        }
    }

    /// Overrides the largest response frame the client accepts.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.codec = FrameCodec::new(max_frame_bytes);
        self
    }

    /// Writes one request without waiting for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Framing`] when the frame cannot be written.
    pub fn send(&mut self, request: &Request) -> Result<(), ClientError> {
        self.codec.write_request(&mut self.stream, request)?;
        Ok(())
    }

    /// Reads the next response, including error envelopes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] when the stream ends and
    /// [`ClientError::Framing`] when the frame is malformed.
    pub fn receive(&mut self) -> Result<Response, ClientError> {
        self.codec
            .read_response(&mut self.stream)?
            .ok_or(ClientError::Closed)
    }

    /// Sends a request and reads its reply, turning error envelopes into
    /// [`ClientError::Server`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for transport failures and daemon errors.
    pub fn call(&mut self, request: impl Into<Request>) -> Result<Response, ClientError> {
        let request = request.into();
        self.send(&request)?;
        match self.receive()? {
            Response::Error(error) => Err(ClientError::Server {
                message: error.message.unwrap_or_default(),
            }),
            response => Ok(response),
        }
    }

    /// Checks that the daemon is alive.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn ping(&mut self) -> Result<(), ClientError> {
        match self.call(PingRequest {})? {
            Response::Ping(_) => Ok(()),
            other => Err(unexpected(MessageType::Ping, &other)),
        }
    }

    /// Echoes `message` through the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn echo(&mut self, message: impl Into<String>) -> Result<String, ClientError> {
        let request = EchoRequest {
            message: Some(message.into()),
        };
        match self.call(request)? {
            Response::Echo(echo) => Ok(echo.message.unwrap_or_default()),
            other => Err(unexpected(MessageType::Echo, &other)),
        }
    }

    /// Creates a container and returns the daemon's reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn create(&mut self, request: CreateRequest) -> Result<CreateResponse, ClientError> {
        match self.call(request)? {
            Response::Create(created) => Ok(created),
            other => Err(unexpected(MessageType::Create, &other)),
        }
    }

    /// Destroys the container named by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn destroy(&mut self, handle: impl Into<String>) -> Result<(), ClientError> {
        let request = DestroyRequest {
            handle: Some(handle.into()),
        };
        match self.call(request)? {
            Response::Destroy(_) => Ok(()),
            other => Err(unexpected(MessageType::Destroy, &other)),
        }
    }

    /// Describes the container named by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn info(&mut self, handle: impl Into<String>) -> Result<InfoResponse, ClientError> {
        let request = InfoRequest {
            handle: Some(handle.into()),
        };
        match self.call(request)? {
            Response::Info(info) => Ok(info),
            other => Err(unexpected(MessageType::Info, &other)),
        }
    }

    /// Lists live container handles.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub fn list(&mut self) -> Result<Vec<String>, ClientError> {
        match self.call(ListRequest {})? {
            Response::List(list) => Ok(list.handles),
            other => Err(unexpected(MessageType::List, &other)),
        }
    }

    /// Borrows the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Releases the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn unexpected(expected: MessageType, actual: &Response) -> ClientError {
    ClientError::UnexpectedResponse {
        expected,
        actual: actual.message_type(),
    }
}
