//! Typed requests and responses on top of [`FrameCodec`].

use std::io::{Read, Write};

use prost::Message;

use crate::frame::{Direction, FrameCodec, FramingError, RawFrame, encode_frame};
use crate::messages::{
    CreateRequest, CreateResponse, DestroyRequest, DestroyResponse, EchoRequest, EchoResponse,
    ErrorResponse, InfoRequest, InfoResponse, ListRequest, ListResponse, PingRequest,
    PingResponse,
};
use crate::MessageType;

/// Every request the daemon understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Liveness probe.
    Ping(PingRequest),
    /// Diagnostic echo.
    Echo(EchoRequest),
    /// Container creation.
    Create(CreateRequest),
    /// Container removal.
    Destroy(DestroyRequest),
    /// Container description.
    Info(InfoRequest),
    /// Handle enumeration.
    List(ListRequest),
}

/// Every response the daemon sends, including the error envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Reply to [`Request::Ping`].
    Ping(PingResponse),
    /// Reply to [`Request::Echo`].
    Echo(EchoResponse),
    /// Reply to [`Request::Create`].
    Create(CreateResponse),
    /// Reply to [`Request::Destroy`].
    Destroy(DestroyResponse),
    /// Reply to [`Request::Info`].
    Info(InfoResponse),
    /// Reply to [`Request::List`].
    List(ListResponse),
    /// Failure of whichever request this answers.
    Error(ErrorResponse),
}

impl Request {
    /// Discriminator written for this request.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Ping(_) => MessageType::Ping,
            Self::Echo(_) => MessageType::Echo,
            Self::Create(_) => MessageType::Create,
            Self::Destroy(_) => MessageType::Destroy,
            Self::Info(_) => MessageType::Info,
            Self::List(_) => MessageType::List,
        }
    }

    /// Encodes the protobuf payload without framing.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Self::Ping(msg) => msg.encode_to_vec(),
            Self::Echo(msg) => msg.encode_to_vec(),
            Self::Create(msg) => msg.encode_to_vec(),
            Self::Destroy(msg) => msg.encode_to_vec(),
            Self::Info(msg) => msg.encode_to_vec(),
            Self::List(msg) => msg.encode_to_vec(),
        }
    }

    /// Encodes a complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::TooLarge`] when the payload exceeds the 32-bit
    /// length prefix.
    pub fn encode_frame(&self) -> Result<Vec<u8>, FramingError> {
        encode_frame(self.message_type(), &self.encode_payload())
    }

    /// Decodes a raw frame read from a client.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnknownMessageType`] for codes that are not
    /// requests and [`FramingError::Payload`] for malformed payloads.
    pub fn decode(frame: &RawFrame) -> Result<Self, FramingError> {
        let message_type = resolve(frame.code, Direction::Request)?;
        let payload = frame.payload.as_slice();
        Ok(match message_type {
            MessageType::Ping => Self::Ping(decode_payload(message_type, payload)?),
            MessageType::Echo => Self::Echo(decode_payload(message_type, payload)?),
            MessageType::Create => Self::Create(decode_payload(message_type, payload)?),
            MessageType::Destroy => Self::Destroy(decode_payload(message_type, payload)?),
            MessageType::Info => Self::Info(decode_payload(message_type, payload)?),
            MessageType::List => Self::List(decode_payload(message_type, payload)?),
            MessageType::Error => {
                return Err(FramingError::UnknownMessageType {
                    code: frame.code,
                    direction: Direction::Request,
                });
            }
        })
    }
}

impl Response {
    /// Builds an error envelope.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorResponse::new(message))
    }

    /// Discriminator written for this response.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Ping(_) => MessageType::Ping,
            Self::Echo(_) => MessageType::Echo,
            Self::Create(_) => MessageType::Create,
            Self::Destroy(_) => MessageType::Destroy,
            Self::Info(_) => MessageType::Info,
            Self::List(_) => MessageType::List,
            Self::Error(_) => MessageType::Error,
        }
    }

    /// Encodes the protobuf payload without framing.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Self::Ping(msg) => msg.encode_to_vec(),
            Self::Echo(msg) => msg.encode_to_vec(),
            Self::Create(msg) => msg.encode_to_vec(),
            Self::Destroy(msg) => msg.encode_to_vec(),
            Self::Info(msg) => msg.encode_to_vec(),
            Self::List(msg) => msg.encode_to_vec(),
            Self::Error(msg) => msg.encode_to_vec(),
        }
    }

    /// Encodes a complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::TooLarge`] when the payload exceeds the 32-bit
    /// length prefix.
    pub fn encode_frame(&self) -> Result<Vec<u8>, FramingError> {
        encode_frame(self.message_type(), &self.encode_payload())
    }

    /// Decodes a raw frame read from the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnknownMessageType`] for unknown codes and
    /// [`FramingError::Payload`] for malformed payloads.
    pub fn decode(frame: &RawFrame) -> Result<Self, FramingError> {
        let message_type = resolve(frame.code, Direction::Response)?;
        let payload = frame.payload.as_slice();
        Ok(match message_type {
            MessageType::Ping => Self::Ping(decode_payload(message_type, payload)?),
            MessageType::Echo => Self::Echo(decode_payload(message_type, payload)?),
            MessageType::Create => Self::Create(decode_payload(message_type, payload)?),
            MessageType::Destroy => Self::Destroy(decode_payload(message_type, payload)?),
            MessageType::Info => Self::Info(decode_payload(message_type, payload)?),
            MessageType::List => Self::List(decode_payload(message_type, payload)?),
            MessageType::Error => Self::Error(decode_payload(message_type, payload)?),
        })
    }
}

macro_rules! impl_from_message {
    ($target:ident, $($message:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$message> for $target {
                fn from(message: $message) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

impl_from_message!(
    Request,
    PingRequest => Ping,
    EchoRequest => Echo,
    CreateRequest => Create,
    DestroyRequest => Destroy,
    InfoRequest => Info,
    ListRequest => List,
);

impl_from_message!(
    Response,
    PingResponse => Ping,
    EchoResponse => Echo,
    CreateResponse => Create,
    DestroyResponse => Destroy,
    InfoResponse => Info,
    ListResponse => List,
    ErrorResponse => Error,
);

impl FrameCodec {
    /// Reads and decodes one request; `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] for malformed, truncated or unknown frames.
    pub fn read_request<R: Read>(&self, reader: &mut R) -> Result<Option<Request>, FramingError> {
        self.read_frame(reader)?
            .map(|frame| Request::decode(&frame))
            .transpose()
    }

    /// Encodes and writes one request.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] when encoding or writing fails.
    pub fn write_request<W: Write>(
        &self,
        writer: &mut W,
        request: &Request,
    ) -> Result<(), FramingError> {
        self.write_frame(writer, request.message_type(), &request.encode_payload())
    }

    /// Reads and decodes one response; `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] for malformed, truncated or unknown frames.
    pub fn read_response<R: Read>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Response>, FramingError> {
        self.read_frame(reader)?
            .map(|frame| Response::decode(&frame))
            .transpose()
    }

    /// Encodes and writes one response.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] when encoding or writing fails.
    pub fn write_response<W: Write>(
        &self,
        writer: &mut W,
        response: &Response,
    ) -> Result<(), FramingError> {
        self.write_frame(writer, response.message_type(), &response.encode_payload())
    }
}

fn resolve(code: u32, direction: Direction) -> Result<MessageType, FramingError> {
    MessageType::from_code(code).ok_or(FramingError::UnknownMessageType { code, direction })
}

fn decode_payload<M>(message_type: MessageType, payload: &[u8]) -> Result<M, FramingError>
where
    M: Message + Default,
{
    M::decode(payload).map_err(|source| FramingError::Payload {
        message_type,
        source,
    })
}
