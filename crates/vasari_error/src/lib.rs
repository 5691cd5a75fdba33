//! Error types for the Vasari batch generation tool.
//!
//! Every error carries the source location where it was raised. The
//! per-domain errors fold into [`VasariErrorKind`], which is boxed inside
//! [`VasariError`] so results stay pointer-sized.

mod config;
mod generation;
mod json;
mod storage;

pub use config::ConfigError;
pub use generation::{GenerationError, GenerationErrorKind};
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum VasariErrorKind {
    /// Configuration error
    #[display("{}", _0)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[display("{}", _0)]
    Json(JsonError),
    /// Dialog file storage error
    #[display("{}", _0)]
    Storage(StorageError),
    /// Generation error
    #[display("{}", _0)]
    Generation(GenerationError),
}

/// Vasari error with kind discrimination.
#[derive(Debug)]
pub struct VasariError(Box<VasariErrorKind>);

impl VasariError {
    /// Create a new error from a kind.
    pub fn new(kind: VasariErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VasariErrorKind {
        &self.0
    }

    /// Returns the generation error if this error came from a generator.
    pub fn as_generation(&self) -> Option<&GenerationError> {
        match self.kind() {
            VasariErrorKind::Generation(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for VasariError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vasari Error: {}", self.0)
    }
}

impl std::error::Error for VasariError {}

// Generic From implementation for any type that converts to VasariErrorKind
impl<T> From<T> for VasariError
where
    T: Into<VasariErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vasari operations.
pub type VasariResult<T> = std::result::Result<T, VasariError>;
