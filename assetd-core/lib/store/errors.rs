use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an asset store lookup.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error looking up an asset. Each variant maps to a distinct client-visible status.
#[derive(pretty_error_debug::Debug, Error)]
pub enum StoreError {
    /// No regular file exists at the requested path.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The path escapes the static root, or the file cannot be read by this process.
    #[error("access to asset forbidden: {0}")]
    Forbidden(String),

    /// Reading the asset failed for another reason. Not retried.
    #[error("failed to read asset {path}: {source}")]
    Io {
        /// The requested relative path.
        path: String,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StoreError {
    /// Classifies an I/O error raised while resolving or opening `path`.
    pub(crate) fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                StoreError::NotFound(path.to_string())
            }
            std::io::ErrorKind::PermissionDenied => {
                tracing::warn!(path = %path, "asset is not readable by this process");
                StoreError::Forbidden(path.to_string())
            }
            _ => StoreError::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};

    use super::*;

    #[test]
    fn test_from_io_classifies_error_kinds() {
        let path = "profile_images/29.png";

        assert!(matches!(
            StoreError::from_io(path, Error::from(ErrorKind::NotFound)),
            StoreError::NotFound(p) if p == path
        ));
        assert!(matches!(
            StoreError::from_io(path, Error::from(ErrorKind::NotADirectory)),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            StoreError::from_io(path, Error::from(ErrorKind::PermissionDenied)),
            StoreError::Forbidden(p) if p == path
        ));

        match StoreError::from_io(path, Error::other("input/output error")) {
            StoreError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), ErrorKind::Other);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
