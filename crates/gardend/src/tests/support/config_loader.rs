//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use tempfile::TempDir;

use garden_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that places the daemon socket under a temporary directory.
pub struct TestConfigLoader {
    dir: TempDir,
    relative_socket: String,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_relative_socket("run/gardend.sock")
    }

    /// Places the socket at `relative` beneath the temporary directory.
    #[must_use]
    pub fn with_relative_socket(relative: &str) -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temporary directory for socket"),
            relative_socket: relative.to_owned(),
        }
    }

    pub fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf())
            .expect("temporary directory was not valid UTF-8")
    }

    pub fn socket_path(&self) -> Utf8PathBuf {
        self.root().join(&self.relative_socket)
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: self.socket_path(),
            log_filter: "gardend=debug".to_owned(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an unparsable CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_args(vec![
            OsString::from("gardend"),
            OsString::from("--max-frame-bytes"),
            OsString::from("plenty"),
        ])
    }
}
