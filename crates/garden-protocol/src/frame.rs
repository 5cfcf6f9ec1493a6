//! Length-prefixed framing over blocking byte streams.
//!
//! ```text
//! +------------------+-----------------------+--------------------------+
//! | length (u32, BE) | message type (u32, BE)| payload (length - 4)     |
//! +------------------+-----------------------+--------------------------+
//! ```
//!
//! `length` counts the discriminator and the payload but not itself.

use std::fmt;
use std::io::{self, Read, Write};

use thiserror::Error;

use crate::MessageType;

/// Bytes occupied by the length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Bytes occupied by the message type discriminator.
pub const DISCRIMINATOR_LEN: u32 = 4;

/// Default upper bound on a declared frame length (1 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 1024 * 1024;

/// Which side of the conversation a frame is decoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to daemon.
    Request,
    /// Daemon to client.
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Request => "request",
            Self::Response => "response",
        })
    }
}

/// Failures that leave the byte stream in an unknown state.
///
/// Any of these is fatal to the connection it occurred on.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The stream ended part-way through a frame.
    #[error("stream closed mid-frame while reading the {section}")]
    Truncated {
        /// Frame section being read when the stream ended.
        section: &'static str,
    },
    /// The declared length exceeds the configured limit.
    #[error("frame of {length} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Declared or computed frame length.
        length: u64,
        /// Configured limit.
        max: u32,
    },
    /// The declared length cannot even hold the discriminator.
    #[error("frame length {length} is shorter than the message type")]
    Undersized {
        /// Declared frame length.
        length: u32,
    },
    /// The discriminator is unknown or not valid in this direction.
    #[error("unknown {direction} message type {code}")]
    UnknownMessageType {
        /// Raw discriminator.
        code: u32,
        /// Direction the frame was decoded for.
        direction: Direction,
    },
    /// The payload is not a valid encoding of the discriminated message.
    #[error("malformed {message_type} payload: {source}")]
    Payload {
        /// Discriminated message type.
        message_type: MessageType,
        /// Underlying protobuf error.
        #[source]
        source: prost::DecodeError,
    },
    /// The underlying stream failed.
    #[error("stream IO failed: {0}")]
    Io(#[from] io::Error),
}

/// A frame whose payload has not been decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Discriminator as read from the wire.
    pub code: u32,
    /// Encoded message payload.
    pub payload: Vec<u8>,
}

/// Reads and writes frames, enforcing a maximum declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    max_frame_bytes: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl FrameCodec {
    /// Builds a codec that rejects frames longer than `max_frame_bytes`.
    #[must_use]
    pub const fn new(max_frame_bytes: u32) -> Self {
        Self { max_frame_bytes }
    }

    /// Configured frame limit.
    #[must_use]
    pub const fn max_frame_bytes(&self) -> u32 {
        self.max_frame_bytes
    }

    /// Reads one frame.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly before the first byte of
    /// a frame.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] when the stream ends mid-frame, the declared
    /// length is out of bounds, or the stream fails.
    pub fn read_frame<R: Read>(&self, reader: &mut R) -> Result<Option<RawFrame>, FramingError> {
        let mut prefix = [0_u8; LENGTH_PREFIX_LEN];
        if !read_prefix(reader, &mut prefix)? {
            return Ok(None);
        }

        let length = u32::from_be_bytes(prefix);
        if length > self.max_frame_bytes {
            return Err(FramingError::TooLarge {
                length: u64::from(length),
                max: self.max_frame_bytes,
            });
        }
        if length < DISCRIMINATOR_LEN {
            return Err(FramingError::Undersized { length });
        }

        let mut discriminator = [0_u8; 4];
        read_section(reader, &mut discriminator, "message type")?;
        let code = u32::from_be_bytes(discriminator);

        let payload_len = usize::try_from(length - DISCRIMINATOR_LEN).map_err(|_| {
            FramingError::TooLarge {
                length: u64::from(length),
                max: self.max_frame_bytes,
            }
        })?;
        let mut payload = vec![0_u8; payload_len];
        read_section(reader, &mut payload, "payload")?;

        Ok(Some(RawFrame { code, payload }))
    }

    /// Writes one frame and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::TooLarge`] when the payload cannot be described
    /// by a 32-bit length, or [`FramingError::Io`] when writing fails.
    pub fn write_frame<W: Write>(
        &self,
        writer: &mut W,
        message_type: MessageType,
        payload: &[u8],
    ) -> Result<(), FramingError> {
        let frame = encode_frame(message_type, payload)?;
        writer.write_all(&frame)?;
        writer.flush()?;
        Ok(())
    }
}

/// Encodes a complete frame into a buffer.
///
/// # Errors
///
/// Returns [`FramingError::TooLarge`] when the payload cannot be described by a
/// 32-bit length.
pub fn encode_frame(message_type: MessageType, payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    let length = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(DISCRIMINATOR_LEN))
        .ok_or(FramingError::TooLarge {
            length: payload.len() as u64 + u64::from(DISCRIMINATOR_LEN),
            max: u32::MAX,
        })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + 4 + payload.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(&message_type.code().to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Fills the length prefix, distinguishing a clean end of stream.
fn read_prefix<R: Read>(reader: &mut R, prefix: &mut [u8]) -> Result<bool, FramingError> {
    let mut filled = 0;
    while filled < prefix.len() {
        let Some(remaining) = prefix.get_mut(filled..) else {
            break;
        };
        match read_with_retry(reader, remaining)? {
            0 if filled == 0 => return Ok(false),
            0 => {
                return Err(FramingError::Truncated {
                    section: "length prefix",
                });
            }
            read => filled += read,
        }
    }
    Ok(true)
}

fn read_section<R: Read>(
    reader: &mut R,
    buffer: &mut [u8],
    section: &'static str,
) -> Result<(), FramingError> {
    reader.read_exact(buffer).map_err(|error| {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            FramingError::Truncated { section }
        } else {
            FramingError::Io(error)
        }
    })
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
