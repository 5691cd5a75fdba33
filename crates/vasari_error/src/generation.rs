//! Generation error types.

/// Specific error conditions raised while generating a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Tokenized prompt does not fit the configured budget
    #[display(
        "prompt resulted in {} tokens, must be fewer than --max-prompt-tokens ({})",
        tokens,
        max
    )]
    PromptTooLong {
        /// Token count of the rendered prompt
        tokens: usize,
        /// Configured `max_prompt_tokens`
        max: usize,
    },
    /// Tokenizer failed to load, encode or decode
    #[display("Tokenizer error: {}", _0)]
    Tokenizer(String),
    /// Model weights or configuration could not be loaded
    #[display("Model load error: {}", _0)]
    ModelLoad(String),
    /// Inference failed inside the model runtime
    #[display("Inference error: {}", _0)]
    Inference(String),
    /// HTTP/network error talking to an inference server
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// Inference server returned an error status
    #[display("API error (status {}): {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the server
        message: String,
    },
    /// Inference server response could not be parsed
    #[display("Response parsing failed: {}", _0)]
    ResponseParsing(String),
    /// Requested backend or option is not available in this build
    #[display("Unsupported: {}", _0)]
    Unsupported(String),
}

/// Error type for generation operations.
///
/// # Examples
///
/// ```
/// use vasari_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::PromptTooLong { tokens: 2048, max: 1024 });
/// assert!(format!("{}", err).contains("2048 tokens"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error is a prompt budget violation.
    pub fn is_prompt_too_long(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::PromptTooLong { .. })
    }
}

impl From<GenerationErrorKind> for GenerationError {
    #[track_caller]
    fn from(kind: GenerationErrorKind) -> Self {
        Self::new(kind)
    }
}
