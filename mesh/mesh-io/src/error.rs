//! Error types for mesh I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// The file parsed but contained no triangles.
    #[error("mesh contains no faces")]
    EmptyMesh,

    /// Invalid header in binary STL.
    #[error("invalid STL header: expected {expected} bytes, got {got}")]
    InvalidHeader {
        /// Expected header size.
        expected: usize,
        /// Actual header size.
        got: usize,
    },

    /// Binary STL body shorter than its declared face count.
    #[error("invalid face count: expected {expected}, got {got}")]
    InvalidFaceCount {
        /// Expected number of faces.
        expected: u32,
        /// Actual number of faces read.
        got: u32,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map an open failure, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_mapped() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let mapped = IoError::from_open(err, std::path::Path::new("a/b.obj"));
        assert!(matches!(mapped, IoError::FileNotFound { .. }));
        assert!(mapped.to_string().contains("a/b.obj"));
    }

    #[test]
    fn other_io_errors_pass_through() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let mapped = IoError::from_open(err, std::path::Path::new("x.stl"));
        assert!(matches!(mapped, IoError::Io(_)));
    }
}
