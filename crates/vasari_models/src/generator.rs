//! The generation seam shared by every backend.

use async_trait::async_trait;
use vasari_core::GenerationConfig;
use vasari_error::{GenerationError, GenerationErrorKind, VasariResult};

/// A backend that turns a rendered prompt into response text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a response for `prompt`.
    ///
    /// Implementations must reject prompts whose token count is not below
    /// `config.max_prompt_tokens()` with
    /// [`GenerationErrorKind::PromptTooLong`] before decoding anything.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> VasariResult<String>;

    /// Short backend identifier for logs.
    fn provider_name(&self) -> &'static str;

    /// Model path or identifier served by this backend.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> VasariResult<String> {
        (**self).generate(prompt, config).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Fails unless `tokens` is strictly below `max_prompt_tokens`.
///
/// # Examples
///
/// ```
/// use vasari_models::check_prompt_budget;
///
/// assert!(check_prompt_budget(1023, 1024).is_ok());
/// assert!(check_prompt_budget(1024, 1024).is_err());
/// ```
pub fn check_prompt_budget(tokens: usize, max_prompt_tokens: usize) -> Result<(), GenerationError> {
    if tokens < max_prompt_tokens {
        Ok(())
    } else {
        Err(GenerationError::new(GenerationErrorKind::PromptTooLong {
            tokens,
            max: max_prompt_tokens,
        }))
    }
}

/// Picks the response tokens out of a decoder's output sequence.
///
/// Encoder-decoder models emit only the response, so the whole sequence is
/// kept. Decoder-only models echo the prompt first; only the suffix after
/// `prompt_len` tokens is the response.
///
/// # Examples
///
/// ```
/// use vasari_models::select_generated_tokens;
///
/// let output = [1, 2, 3, 40, 41];
/// assert_eq!(select_generated_tokens(&output, 3, false), &[40, 41]);
/// assert_eq!(select_generated_tokens(&output, 3, true), &output);
/// ```
pub fn select_generated_tokens(output: &[u32], prompt_len: usize, is_encoder_decoder: bool) -> &[u32] {
    if is_encoder_decoder {
        output
    } else {
        output.get(prompt_len..).unwrap_or(&[])
    }
}
