//! Request dispatch for daemon connections.
//!
//! [`Dispatcher`] turns one decoded request into exactly one response by
//! calling the [`Backend`](crate::backend::Backend). Validation and backend
//! failures become error envelopes on the same connection.
//! [`DispatchConnectionHandler`] plugs the dispatcher into the transport
//! layer and owns the per-connection read/dispatch/write loop.

mod errors;
mod handler;
mod router;

pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
pub use self::router::Dispatcher;
