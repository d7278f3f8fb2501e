use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures the scaffolding pipeline reports as distinct kinds.
///
/// Functions still return `anyhow::Result`; these values travel inside the
/// `anyhow::Error` and can be recovered with `downcast_ref`.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("project name must not be empty")]
    EmptyProjectName,

    #[error("{path} already exists")]
    PathConflict { path: Utf8PathBuf },

    #[error("permission denied creating {path}")]
    PermissionDenied { path: Utf8PathBuf },

    #[error("command `{command}` failed with exit code {code:?}")]
    ExternalToolFailure { command: String, code: Option<i32> },

    #[error("package manifest not found at {path}")]
    ManifestMissing { path: Utf8PathBuf },

    #[error("package manifest at {path} is malformed: {reason}")]
    ManifestMalformed { path: Utf8PathBuf, reason: String },

    #[error("invalid template descriptor: {reason}")]
    InvalidDescriptor { reason: String },
}

impl ScaffoldError {
    /// Map a directory-creation failure onto the taxonomy, keeping other I/O
    /// errors as plain context-carrying errors.
    pub fn from_create_dir(path: &camino::Utf8Path, err: std::io::Error) -> anyhow::Error {
        match err.kind() {
            std::io::ErrorKind::AlreadyExists => ScaffoldError::PathConflict {
                path: path.to_owned(),
            }
            .into(),
            std::io::ErrorKind::PermissionDenied => ScaffoldError::PermissionDenied {
                path: path.to_owned(),
            }
            .into(),
            _ => anyhow::Error::new(err).context(format!("creating directory {}", path)),
        }
    }

    /// Map a file-write failure the same way; only permission errors get a
    /// dedicated kind.
    pub fn from_write(path: &camino::Utf8Path, err: std::io::Error) -> anyhow::Error {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScaffoldError::PermissionDenied {
                path: path.to_owned(),
            }
            .into(),
            _ => anyhow::Error::new(err).context(format!("writing {}", path)),
        }
    }
}
