use std::fs::DirBuilder;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Ensures the socket's parent directory exists with restrictive permissions.
///
/// Only the daemon binary calls this during bootstrap. The server itself never
/// creates directories, so an unusable path still fails at bind time.
pub fn prepare_socket_directory(path: &Utf8Path) -> Result<(), SocketPreparationError> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Err(SocketPreparationError::MissingParent {
            path: path.to_path_buf(),
        });
    };

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    if let Err(source) = builder.create(parent.as_std_path())
        && !parent.is_dir()
    {
        return Err(SocketPreparationError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing from the socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    /// Failed to create the socket directory.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        (dir, root)
    }

    #[test]
    fn creates_missing_parent_directories() {
        let (_dir, root) = utf8_tempdir();
        let socket = root.join("nested/deeper/gardend.sock");

        prepare_socket_directory(&socket).expect("prepare directory");

        assert!(socket.parent().expect("parent").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn new_directories_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, root) = utf8_tempdir();
        let socket = root.join("private/gardend.sock");
        prepare_socket_directory(&socket).expect("prepare directory");

        let metadata = std::fs::metadata(root.join("private")).expect("metadata");
        assert_eq!(metadata.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn rejects_bare_file_names() {
        let error = prepare_socket_directory(Utf8Path::new("gardend.sock"))
            .expect_err("bare file name has no parent");
        assert!(matches!(error, SocketPreparationError::MissingParent { .. }));
    }

    #[test]
    fn reports_parent_that_is_a_file() {
        let (_dir, root) = utf8_tempdir();
        let blocker = root.join("blocker");
        std::fs::write(&blocker, b"not a directory").expect("write blocker");

        let error = prepare_socket_directory(&blocker.join("gardend.sock"))
            .expect_err("file parent must fail");
        assert!(matches!(
            error,
            SocketPreparationError::CreateDirectory { .. }
        ));
    }
}
