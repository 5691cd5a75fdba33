//! In-process inference with candle.

mod decode;
mod loader;

use crate::{DeviceKind, HfTokenizer, TextGenerator, check_prompt_budget, select_generated_tokens};
use async_trait::async_trait;
use candle_core::Device;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use decode::{Architecture, DecodeParams};
use derive_builder::Builder;
use derive_getters::Getters;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, instrument};
use vasari_core::GenerationConfig;
use vasari_error::{GenerationError, GenerationErrorKind, VasariResult};

/// Where and how to load a model for in-process inference.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(setter(into))]
pub struct CandleOptions {
    /// Local model directory or Hugging Face hub id
    model_path: String,
    /// Hub revision, ignored for local directories
    #[builder(default = "\"main\".to_string()")]
    revision: String,
    /// Device to run on
    #[builder(default)]
    device: DeviceKind,
    /// Explicit `tokenizer.json`, overriding the one next to the weights
    #[builder(default)]
    tokenizer: Option<PathBuf>,
    /// Window for the repetition penalty; `None` penalizes the whole sequence
    #[builder(default)]
    repeat_last_n: Option<usize>,
}

impl CandleOptions {
    /// Creates a new builder for `CandleOptions`.
    pub fn builder() -> CandleOptionsBuilder {
        CandleOptionsBuilder::default()
    }
}

/// A model and tokenizer resident in this process.
pub(crate) struct LoadedModel {
    architecture: Architecture,
    tokenizer: HfTokenizer,
    device: Device,
    repeat_last_n: Option<usize>,
}

impl LoadedModel {
    fn generate(&mut self, prompt: &str, config: &GenerationConfig) -> Result<String, GenerationError> {
        let prompt_ids = self.tokenizer.encode(prompt)?;
        check_prompt_budget(prompt_ids.len(), *config.max_prompt_tokens())?;

        let params = DecodeParams {
            max_new_tokens: *config.max_new_tokens(),
            repetition_penalty: *config.repetition_penalty(),
            repeat_last_n: self.repeat_last_n,
        };
        let mut processor = LogitsProcessor::from_sampling(*config.seed(), sampling_for(config));

        let start = Instant::now();
        let output = self
            .architecture
            .decode(&self.device, &prompt_ids, &params, &mut processor)
            .map_err(|e| GenerationError::new(GenerationErrorKind::Inference(e.to_string())))?;

        let is_encoder_decoder = self.architecture.is_encoder_decoder();
        let generated = select_generated_tokens(&output, prompt_ids.len(), is_encoder_decoder);
        debug!(
            prompt_tokens = prompt_ids.len(),
            generated_tokens = generated.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Decoding finished"
        );
        self.tokenizer.decode(generated)
    }
}

fn sampling_for(config: &GenerationConfig) -> Sampling {
    let temperature = f64::from(*config.temperature());
    let top_p = f64::from(*config.top_p());
    if temperature <= 0.0 {
        Sampling::ArgMax
    } else if top_p < 1.0 {
        Sampling::TopP {
            p: top_p,
            temperature,
        }
    } else {
        Sampling::All { temperature }
    }
}

/// Generator running a Llama-family or T5 checkpoint with candle.
///
/// Decoding is CPU/GPU bound, so each call runs on the blocking pool while
/// the model sits behind a mutex.
pub struct CandleGenerator {
    model_name: String,
    state: Arc<Mutex<LoadedModel>>,
}

impl std::fmt::Debug for CandleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleGenerator")
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl CandleGenerator {
    /// Loads weights, configuration and tokenizer.
    ///
    /// # Errors
    ///
    /// Fails if files cannot be found or downloaded, the architecture is not
    /// supported, or the weights do not match the configuration.
    #[instrument(skip_all, fields(model_path = %options.model_path(), device = %options.device()))]
    pub fn load(options: &CandleOptions) -> Result<Self, GenerationError> {
        let start = Instant::now();
        let device = loader::device_for(*options.device())?;
        let files = loader::resolve_files(options)?;
        let tokenizer = HfTokenizer::from_file(files.tokenizer())?;
        let architecture = loader::load_architecture(&files, &device, &tokenizer)?;

        info!(
            encoder_decoder = architecture.is_encoder_decoder(),
            elapsed_ms = start.elapsed().as_millis(),
            "Model loaded"
        );

        Ok(Self {
            model_name: options.model_path().clone(),
            state: Arc::new(Mutex::new(LoadedModel {
                architecture,
                tokenizer,
                device,
                repeat_last_n: *options.repeat_last_n(),
            })),
        })
    }
}

#[async_trait]
impl TextGenerator for CandleGenerator {
    #[instrument(skip_all, fields(model = %self.model_name))]
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> VasariResult<String> {
        let state = Arc::clone(&self.state);
        let prompt = prompt.to_string();
        let config = config.clone();

        let text = tokio::task::spawn_blocking(move || -> Result<String, GenerationError> {
            let mut model = state.lock().map_err(|_| {
                GenerationError::new(GenerationErrorKind::Inference(
                    "model lock poisoned by an earlier panic".to_string(),
                ))
            })?;
            model.generate(&prompt, &config)
        })
        .await
        .map_err(|e| {
            GenerationError::new(GenerationErrorKind::Inference(format!(
                "generation task failed: {}",
                e
            )))
        })??;

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "candle"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
