//! Dialog file storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Dialog file not found at the specified location
    #[display("Dialog file not found: {}", _0)]
    NotFound(String),
    /// Permission denied when accessing the file
    #[display("Permission denied: {}", _0)]
    PermissionDenied(String),
    /// I/O error while reading the dialog file
    #[display("Failed to read {}: {}", path, message)]
    Read {
        /// Path being read
        path: String,
        /// Underlying I/O message
        message: String,
    },
    /// I/O error while writing the output file
    #[display("Failed to write {}: {}", path, message)]
    Write {
        /// Path being written
        path: String,
        /// Underlying I/O message
        message: String,
    },
    /// Generic storage error with message
    #[display("{}", _0)]
    Other(String),
}

impl StorageErrorKind {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_read(path: &std::path::Path, err: &std::io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Read {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Classify an I/O error raised while writing `path`.
    pub fn from_write(path: &std::path::Path, err: &std::io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Write {
                path,
                message: err.to_string(),
            },
        }
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use vasari_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("dialogs.json".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
