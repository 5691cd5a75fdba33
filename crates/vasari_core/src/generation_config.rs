//! Sampling configuration shared by every generation backend.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use vasari_error::{ConfigError, VasariResult};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default repetition penalty (1.0 means no penalty).
pub const DEFAULT_REPETITION_PENALTY: f32 = 1.0;
/// Repetition penalty substituted for T5 models left at the default.
pub const T5_REPETITION_PENALTY: f32 = 1.2;
/// Default cap on generated tokens.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 512;
/// Default nucleus sampling cutoff.
pub const DEFAULT_TOP_P: f32 = 0.9;
/// Default cap on prompt tokens (exclusive).
pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 1024;
/// Default sampling seed.
pub const DEFAULT_SEED: u64 = 299_792_458;

/// Sampling parameters fixed for an entire run.
///
/// # Examples
///
/// ```
/// use vasari_core::GenerationConfig;
///
/// let config = GenerationConfig::builder().temperature(0.2).build().unwrap();
/// assert_eq!(*config.temperature(), 0.2);
/// assert_eq!(*config.max_new_tokens(), 512);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature; 0 selects greedy decoding
    temperature: f32,
    /// Penalty applied to already generated tokens
    repetition_penalty: f32,
    /// Maximum number of tokens to generate
    max_new_tokens: usize,
    /// Nucleus sampling probability cutoff
    top_p: f32,
    /// Prompts must tokenize to fewer tokens than this
    max_prompt_tokens: usize,
    /// Seed for the sampler
    seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            top_p: DEFAULT_TOP_P,
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            seed: DEFAULT_SEED,
        }
    }
}

impl GenerationConfig {
    /// Returns a builder for constructing a GenerationConfig.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    /// Applies model-specific defaults.
    ///
    /// T5 models degenerate without a repetition penalty, so a penalty left
    /// at exactly 1.0 is raised to 1.2 when the model path mentions `t5`.
    pub fn adjusted_for_model(mut self, model_path: &str) -> Self {
        let untouched = (self.repetition_penalty - DEFAULT_REPETITION_PENALTY).abs() < f32::EPSILON;
        if untouched && model_path.to_lowercase().contains("t5") {
            tracing::debug!(
                model_path,
                repetition_penalty = T5_REPETITION_PENALTY,
                "Raising default repetition penalty for T5 model"
            );
            self.repetition_penalty = T5_REPETITION_PENALTY;
        }
        self
    }

    /// Checks that the parameters are usable by a sampler.
    pub fn check(&self) -> VasariResult<()> {
        match self.problem() {
            Some(message) => Err(ConfigError::new(message).into()),
            None => Ok(()),
        }
    }

    fn problem(&self) -> Option<String> {
        if !(self.temperature >= 0.0 && self.temperature.is_finite()) {
            return Some(format!("temperature must be >= 0, got {}", self.temperature));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Some(format!("top_p must be in (0, 1], got {}", self.top_p));
        }
        if !(self.repetition_penalty > 0.0 && self.repetition_penalty.is_finite()) {
            return Some(format!(
                "repetition_penalty must be > 0, got {}",
                self.repetition_penalty
            ));
        }
        if self.max_new_tokens == 0 {
            return Some("max_new_tokens must be at least 1".to_string());
        }
        if self.max_prompt_tokens == 0 {
            return Some("max_prompt_tokens must be at least 1".to_string());
        }
        None
    }
}

impl GenerationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = GenerationConfig::default();
        let candidate = GenerationConfig {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            repetition_penalty: self
                .repetition_penalty
                .unwrap_or(defaults.repetition_penalty),
            max_new_tokens: self.max_new_tokens.unwrap_or(defaults.max_new_tokens),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            max_prompt_tokens: self.max_prompt_tokens.unwrap_or(defaults.max_prompt_tokens),
            seed: self.seed.unwrap_or(defaults.seed),
        };
        match candidate.problem() {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }
}
