//! Shared doubles and harnesses for the daemon test suites.

mod backend;
mod config_loader;
mod reporter;
mod server_world;

pub use backend::FakeBackend;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use server_world::ServerWorld;
