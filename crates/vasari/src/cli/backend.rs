//! Choosing and constructing the generation backend.

use crate::cli::Settings;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use vasari_error::{GenerationError, GenerationErrorKind, VasariResult};
use vasari_models::{HfTokenizer, TextGenerator, TgiGenerator, TiktokenCounter, TokenCounter};
use vasari_template::{ConversationTemplate, conversation_template_by_name, conversation_template_for};

/// Which backend produces generations.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    /// A text-generation-inference server over HTTP
    #[default]
    Tgi,
    /// In-process inference (requires the `candle` feature)
    Candle,
}

/// The template named by `--conv-template`, or the one matching the model.
///
/// # Errors
///
/// Fails if an explicit template name is not registered.
pub fn select_template(settings: &Settings) -> VasariResult<ConversationTemplate> {
    let template = match settings.conv_template() {
        Some(name) => conversation_template_by_name(name)?,
        None => conversation_template_for(settings.model_path()),
    };
    info!(template = %template.name(), "Conversation template selected");
    Ok(template)
}

/// Where the prompt budget tokenizer for a remote backend comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerSource {
    /// A local `tokenizer.json`
    File(PathBuf),
    /// `tokenizer.json` of a hub model
    Hub {
        /// Hub model id
        repo: String,
        /// Branch, tag or commit
        revision: String,
    },
    /// The `cl100k_base` estimate
    Estimate,
}

/// Decides which tokenizer counts prompt tokens.
///
/// An explicit `--tokenizer` wins. A local model directory supplies its own
/// `tokenizer.json`, or falls back to the estimate when it has none. Any
/// other model path is treated as a hub id.
pub fn tokenizer_source(settings: &Settings) -> TokenizerSource {
    if let Some(path) = settings.tokenizer() {
        return TokenizerSource::File(path.clone());
    }
    let model_dir = Path::new(settings.model_path());
    if model_dir.is_dir() {
        let candidate = model_dir.join("tokenizer.json");
        return if candidate.is_file() {
            TokenizerSource::File(candidate)
        } else {
            TokenizerSource::Estimate
        };
    }
    TokenizerSource::Hub {
        repo: settings.model_path().clone(),
        revision: settings.revision().clone(),
    }
}

async fn token_counter(settings: &Settings) -> VasariResult<Box<dyn TokenCounter>> {
    match tokenizer_source(settings) {
        TokenizerSource::File(path) => Ok(Box::new(HfTokenizer::from_file(path)?)),
        TokenizerSource::Hub { repo, revision } => {
            info!(%repo, %revision, "Fetching tokenizer from the hub");
            let tokenizer =
                tokio::task::spawn_blocking(move || HfTokenizer::from_hub(&repo, &revision))
                    .await
                    .map_err(|e| {
                        GenerationError::new(GenerationErrorKind::Tokenizer(format!(
                            "tokenizer download task failed: {}",
                            e
                        )))
                    })??;
            Ok(Box::new(tokenizer))
        }
        TokenizerSource::Estimate => {
            warn!(
                model = %settings.model_path(),
                "Model directory has no tokenizer.json, estimating prompt tokens with cl100k_base"
            );
            Ok(Box::new(TiktokenCounter::cl100k()?))
        }
    }
}

/// Builds the configured backend.
///
/// # Errors
///
/// Fails if the tokenizer or model cannot be loaded, or if the in-process
/// backend was requested in a build without it.
#[instrument(skip_all, fields(backend = %settings.backend(), model = %settings.model_path()))]
pub async fn build_generator(settings: &Settings) -> VasariResult<Box<dyn TextGenerator>> {
    match settings.backend() {
        Backend::Tgi => {
            let counter = token_counter(settings).await?;
            let generator = TgiGenerator::new(settings.server_url(), settings.model_path(), counter);
            info!(endpoint = generator.endpoint(), "Using TGI backend");
            Ok(Box::new(generator))
        }
        Backend::Candle => build_candle(settings).await,
    }
}

#[cfg(feature = "candle")]
async fn build_candle(settings: &Settings) -> VasariResult<Box<dyn TextGenerator>> {
    use vasari_models::{CandleGenerator, CandleOptions};

    let options = CandleOptions::builder()
        .model_path(settings.model_path().clone())
        .revision(settings.revision().clone())
        .device(*settings.device())
        .tokenizer(settings.tokenizer().clone())
        .repeat_last_n(*settings.repeat_last_n())
        .build()
        .map_err(|e| GenerationError::new(GenerationErrorKind::ModelLoad(e.to_string())))?;

    let generator = tokio::task::spawn_blocking(move || CandleGenerator::load(&options))
        .await
        .map_err(|e| {
            GenerationError::new(GenerationErrorKind::ModelLoad(format!(
                "model loading task failed: {}",
                e
            )))
        })??;
    Ok(Box::new(generator))
}

#[cfg(not(feature = "candle"))]
async fn build_candle(_settings: &Settings) -> VasariResult<Box<dyn TextGenerator>> {
    Err(vasari_error::ConfigError::new(
        "The candle backend is not compiled in; rebuild with --features candle",
    )
    .into())
}
