//! Prompt tokenization for budget checks and local decoding.

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::Path;
use tracing::{debug, instrument};
use vasari_error::{GenerationError, GenerationErrorKind};

/// Counts the tokens a prompt will occupy.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens `text` encodes to, special tokens included.
    fn count_tokens(&self, text: &str) -> Result<usize, GenerationError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

fn tokenizer_error(message: impl std::fmt::Display) -> GenerationError {
    GenerationError::new(GenerationErrorKind::Tokenizer(message.to_string()))
}

/// A Hugging Face `tokenizer.json` tokenizer.
///
/// This is the model's own tokenizer, so counts are exact.
#[derive(Clone)]
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    source: String,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("source", &self.source)
            .finish()
    }
}

impl HfTokenizer {
    /// Loads a tokenizer from a `tokenizer.json` file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            tokenizer_error(format!("failed to load {}: {}", path.display(), e))
        })?;
        debug!("Loaded tokenizer");
        Ok(Self {
            inner,
            source: path.display().to_string(),
        })
    }

    /// Downloads (or reuses the cached) `tokenizer.json` of a hub model.
    ///
    /// Blocks on network I/O.
    #[instrument]
    pub fn from_hub(model_id: &str, revision: &str) -> Result<Self, GenerationError> {
        let api = Api::new().map_err(tokenizer_error)?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));
        let path = repo.get("tokenizer.json").map_err(|e| {
            tokenizer_error(format!("failed to fetch tokenizer.json for {}: {}", model_id, e))
        })?;
        Self::from_file(path)
    }

    /// Encodes `text`, adding the model's special tokens (BOS and friends).
    pub fn encode(&self, text: &str) -> Result<Vec<u32>, GenerationError> {
        let encoding = self.inner.encode(text, true).map_err(tokenizer_error)?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Decodes `ids`, dropping special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String, GenerationError> {
        self.inner.decode(ids, true).map_err(tokenizer_error)
    }

    /// Looks up the id of a single token.
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.inner.token_to_id(token)
    }
}

impl TokenCounter for HfTokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize, GenerationError> {
        self.encode(text).map(|ids| ids.len())
    }

    fn name(&self) -> &str {
        &self.source
    }
}

/// Approximate counts with OpenAI's `cl100k_base` encoding.
///
/// Used when the served model's tokenizer is not available locally. Counts
/// for Llama-style vocabularies are usually within a few percent.
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TiktokenCounter(cl100k_base)")
    }
}

impl TiktokenCounter {
    /// Builds the `cl100k_base` encoder.
    pub fn cl100k() -> Result<Self, GenerationError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(tokenizer_error)?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, GenerationError> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }

    fn name(&self) -> &str {
        "cl100k_base"
    }
}
