use camino::Utf8PathBuf;
use std::env;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

/// Largest frame the daemon accepts unless configured otherwise.
pub use garden_protocol::DEFAULT_MAX_FRAME_BYTES;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// File name of the daemon socket inside its runtime directory.
pub const SOCKET_FILE_NAME: &str = "gardend.sock";

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the default socket path for the daemon.
///
/// Prefers `$XDG_RUNTIME_DIR/garden`. When no runtime directory is available
/// the temporary directory is used instead, namespaced by effective user ID so
/// that users on a shared host do not collide.
#[must_use]
pub fn default_socket_path() -> Utf8PathBuf {
    let (mut base, apply_namespace) = match runtime_base_directory() {
        Some(dir) => (dir, false),
        None => (fallback_base_directory(), true),
    };

    base.push("garden");
    if apply_namespace {
        base.push(user_namespace());
    }

    base.join(SOCKET_FILE_NAME)
}

#[cfg(unix)]
fn runtime_base_directory() -> Option<Utf8PathBuf> {
    runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

#[cfg(not(unix))]
fn runtime_base_directory() -> Option<Utf8PathBuf> {
    None
}

fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(unix)]
fn user_namespace() -> String {
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn user_namespace() -> String {
    String::from("shared")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_socket_lives_in_garden_directory() {
        let path = default_socket_path();
        assert_eq!(path.file_name(), Some(SOCKET_FILE_NAME));
        let parent_names: Vec<&str> = path
            .ancestors()
            .filter_map(camino::Utf8Path::file_name)
            .collect();
        assert!(
            parent_names.contains(&"garden"),
            "expected a garden directory in {path}"
        );
    }

    #[test]
    fn frame_limit_matches_the_protocol_codec() {
        assert_eq!(
            DEFAULT_MAX_FRAME_BYTES,
            garden_protocol::FrameCodec::default().max_frame_bytes()
        );
    }
}
