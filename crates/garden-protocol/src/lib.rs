//! Wire protocol spoken over the Garden daemon socket.
//!
//! Every message travels in a frame made of a big-endian `u32` length, a
//! big-endian `u32` message type and a protobuf payload. A connection carries
//! any number of request/response pairs, answered strictly in order. The
//! daemon replies to a failed request with an [`messages::ErrorResponse`]
//! frame in place of the expected response.

mod client;
mod codec;
mod frame;
mod message_type;
pub mod messages;

pub use client::{Client, ClientError};
pub use codec::{Request, Response};
pub use frame::{
    DEFAULT_MAX_FRAME_BYTES, DISCRIMINATOR_LEN, Direction, FrameCodec, FramingError,
    LENGTH_PREFIX_LEN, RawFrame, encode_frame,
};
pub use message_type::MessageType;
