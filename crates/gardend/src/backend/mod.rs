//! Container-management capability consumed by the dispatcher.
//!
//! The protocol layer never touches container state directly. Everything it
//! knows about containers comes through [`Backend`], so the in-memory
//! registry used by the daemon binary and the fakes used in tests are
//! interchangeable.

mod memory;

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub use self::memory::InMemoryBackend;

/// Operations a container manager exposes to the daemon.
///
/// Implementations are shared between connection threads and must serialise
/// their own mutations.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Liveness probe; success carries no data.
    fn ping(&self) -> Result<(), BackendError>;

    /// Returns `message` unchanged.
    fn echo(&self, message: &str) -> String;

    /// Registers a container built from `spec` and returns its handle.
    ///
    /// An empty handle in `spec` asks the backend to assign one.
    fn create(&self, spec: ContainerSpec) -> Result<Handle, BackendError>;

    /// Removes the container named by `handle`.
    fn destroy(&self, handle: &Handle) -> Result<(), BackendError>;

    /// Describes the container named by `handle`.
    fn lookup(&self, handle: &Handle) -> Result<Container, BackendError>;

    /// Handles of every live container.
    fn handles(&self) -> Result<Vec<Handle>, BackendError>;
}

/// Identifier of a container, unique among live containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(String);

impl Handle {
    /// Wraps a raw handle string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the handle text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the client left the handle for the backend to pick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the handle, returning the raw string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Access mode for a [`BindMount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindMountMode {
    /// The container may only read the mount.
    ReadOnly,
    /// The container may read and write the mount.
    ReadWrite,
}

/// Host path exposed inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Path on the host.
    pub src_path: String,
    /// Path inside the container.
    pub dst_path: String,
    /// Access mode.
    pub mode: BindMountMode,
}

/// Immutable description of a container to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Requested handle; empty means the backend assigns one.
    pub handle: Handle,
    /// How long the container may stay unreferenced; zero selects the
    /// backend default.
    pub grace_time: Duration,
    /// Opaque network descriptor.
    pub network: String,
    /// Root filesystem path.
    pub root_fs_path: String,
    /// Bind mounts in the order the client supplied them.
    pub bind_mounts: Vec<BindMount>,
}

/// Lifecycle state of a registered container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerState {
    /// Registered and available.
    Active,
}

impl ContainerState {
    /// Lowercase name reported over the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container as the backend records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Handle the container is registered under.
    pub handle: Handle,
    /// Spec the container was created from, with the final handle filled in.
    pub spec: ContainerSpec,
    /// Current lifecycle state.
    pub state: ContainerState,
}

/// Failure reported by a backend operation.
///
/// The message is delivered to clients verbatim, so `Display` prints it and
/// nothing else.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl BackendError {
    /// Builds an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A container with `handle` is already registered.
    #[must_use]
    pub fn already_exists(handle: &Handle) -> Self {
        Self::new(format!("container already exists: {handle}"))
    }

    /// No container is registered under `handle`.
    #[must_use]
    pub fn not_found(handle: &Handle) -> Self {
        Self::new(format!("unknown handle: {handle}"))
    }

    /// Message delivered to the client.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    #[test]
    fn backend_error_displays_only_its_message() {
        let error = BackendError::with_source("oh no!", io::Error::other("disk on fire"));
        assert_eq!(error.to_string(), "oh no!");
        assert!(error.source().is_some());
    }

    #[test]
    fn duplicate_handle_message_names_the_handle() {
        let error = BackendError::already_exists(&Handle::from("some-handle"));
        assert_eq!(error.message(), "container already exists: some-handle");
    }
}
