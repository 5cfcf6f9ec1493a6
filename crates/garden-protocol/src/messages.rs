//! Protobuf payloads carried inside wire frames.
//!
//! Every scalar is `optional` so that a field added by a newer peer can be
//! told apart from an explicit value, and so that older decoders skip fields
//! they do not know.

/// Liveness probe. Carries no payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingRequest {}

/// Reply to [`PingRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingResponse {}

/// Diagnostic request echoed back verbatim.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EchoRequest {
    #[prost(string, optional, tag = "1")]
    pub message: ::core::option::Option<::prost::alloc::string::String>,
}

/// Reply to [`EchoRequest`] carrying the identical message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EchoResponse {
    #[prost(string, optional, tag = "1")]
    pub message: ::core::option::Option<::prost::alloc::string::String>,
}

/// Host path mapped into a container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BindMount {
    #[prost(string, optional, tag = "1")]
    pub src_path: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "2")]
    pub dst_path: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(enumeration = "bind_mount::Mode", optional, tag = "3")]
    pub mode: ::core::option::Option<i32>,
}

/// Nested types for [`BindMount`].
pub mod bind_mount {
    /// Access mode of a bind mount.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Mode {
        /// Read-only.
        Ro = 0,
        /// Read-write.
        Rw = 1,
    }
}

/// Creates a container from the supplied description.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateRequest {
    #[prost(message, repeated, tag = "1")]
    pub bind_mounts: ::prost::alloc::vec::Vec<BindMount>,
    /// Seconds a container may stay unreferenced before it is reaped.
    #[prost(uint32, optional, tag = "2")]
    pub grace_time: ::core::option::Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub handle: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "4")]
    pub network: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "5")]
    pub rootfs: ::core::option::Option<::prost::alloc::string::String>,
}

/// Reply to [`CreateRequest`] naming the container handle.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResponse {
    #[prost(string, optional, tag = "1")]
    pub handle: ::core::option::Option<::prost::alloc::string::String>,
}

/// Removes a container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DestroyRequest {
    #[prost(string, optional, tag = "1")]
    pub handle: ::core::option::Option<::prost::alloc::string::String>,
}

/// Reply to [`DestroyRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DestroyResponse {}

/// Describes a single container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InfoRequest {
    #[prost(string, optional, tag = "1")]
    pub handle: ::core::option::Option<::prost::alloc::string::String>,
}

/// Reply to [`InfoRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InfoResponse {
    #[prost(string, optional, tag = "1")]
    pub state: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "2")]
    pub grace_time: ::core::option::Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub network: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "4")]
    pub rootfs: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "5")]
    pub bind_mounts: ::prost::alloc::vec::Vec<BindMount>,
}

/// Enumerates live container handles.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRequest {}

/// Reply to [`ListRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListResponse {
    #[prost(string, repeated, tag = "1")]
    pub handles: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// Failure reported in place of any response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorResponse {
    #[prost(string, optional, tag = "2")]
    pub message: ::core::option::Option<::prost::alloc::string::String>,
}

impl ErrorResponse {
    /// Builds an error envelope carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}
