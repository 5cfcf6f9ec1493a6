//! Control-plane daemon for the Garden container runtime.
//!
//! The daemon listens on a Unix domain socket and speaks the framed protobuf
//! protocol defined in [`garden_protocol`]. Each accepted connection is served
//! on its own thread: frames are decoded into requests, routed by the
//! [`Dispatcher`] to a pluggable [`Backend`], and answered with exactly one
//! response or error envelope. Namespace, cgroup and filesystem work belongs
//! to the backend; the daemon itself only validates and routes.
//!
//! [`run_daemon`] wires the production pieces together: configuration from
//! [`garden_config`], structured telemetry, an [`InMemoryBackend`], and a
//! [`Server`] that runs until a termination signal arrives.

pub mod backend;
mod bootstrap;
mod dispatch;
mod health;
mod process;
mod server;
mod telemetry;
mod transport;

pub use backend::{
    Backend, BackendError, BindMount, BindMountMode, Container, ContainerSpec, ContainerState,
    Handle, InMemoryBackend,
};
pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
pub use dispatch::{DispatchError, Dispatcher};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use server::{Server, ServerError};
pub use telemetry::{TelemetryError, is_installed as telemetry_installed};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
