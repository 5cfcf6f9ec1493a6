//! Shared configuration for the Garden daemon and its tooling.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! TOML file named by `--config-path` or `GARDEN_CONFIG_PATH`, then
//! `GARDEN_*` environment variables, then command-line flags.

mod defaults;
mod logging;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES, SOCKET_FILE_NAME, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_path,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketPreparationError, prepare_socket_directory};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "GARDEN")]
pub struct Config {
    /// Filesystem path of the Unix domain socket the daemon listens on.
    #[ortho_config(default = default_socket_path())]
    pub daemon_socket: Utf8PathBuf,
    /// `tracing` filter expression, for example `info` or `gardend=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for daemon logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Upper bound on the declared length of a single wire frame.
    #[ortho_config(default = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_path(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any configuration layer is malformed.
    pub fn load_from_process() -> Result<Self, Arc<OrthoError>> {
        Self::load()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first element is treated as the program name, mirroring
    /// `std::env::args_os`.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any configuration layer is malformed.
    pub fn load_from_args(args: Vec<OsString>) -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(args)
    }

    /// Socket path the daemon binds.
    #[must_use]
    pub fn daemon_socket(&self) -> &Utf8Path {
        self.daemon_socket.as_path()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Maximum accepted frame length in bytes.
    #[must_use]
    pub const fn max_frame_bytes(&self) -> u32 {
        self.max_frame_bytes
    }

    /// Creates the socket's parent directory with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_socket_directory(&self) -> Result<(), SocketPreparationError> {
        prepare_socket_directory(self.daemon_socket())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.max_frame_bytes(), 1024 * 1024);
        assert_eq!(config.daemon_socket().file_name(), Some(SOCKET_FILE_NAME));
    }
}
