//! TGI `/generate` data transfer objects.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use vasari_core::GenerationConfig;

/// Body of a `POST /generate` request.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, Builder)]
#[builder(setter(into))]
pub struct TgiRequest {
    /// Rendered prompt
    inputs: String,
    /// Sampling parameters
    parameters: TgiParameters,
}

impl TgiRequest {
    /// Creates a new builder for `TgiRequest`.
    pub fn builder() -> TgiRequestBuilder {
        TgiRequestBuilder::default()
    }
}

/// TGI generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, Builder)]
#[builder(setter(into))]
pub struct TgiParameters {
    /// Sample instead of greedy decoding
    do_sample: bool,
    /// Maximum new tokens to generate
    max_new_tokens: u32,
    /// Temperature for sampling (must be > 0 when set)
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Top-p sampling (must be < 1 when set)
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Repetition penalty
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    /// Sampling seed
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    /// Echo the prompt in front of the response
    #[builder(default)]
    return_full_text: bool,
}

impl TgiParameters {
    /// Creates a new builder for `TgiParameters`.
    pub fn builder() -> TgiParametersBuilder {
        TgiParametersBuilder::default()
    }

    /// Maps the run's sampling config onto what TGI accepts.
    ///
    /// TGI rejects `temperature <= 0` and `top_p >= 1`, so a zero
    /// temperature becomes greedy decoding and a top-p of 1 is omitted.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let sampling = *config.temperature() > 0.0;
        Self {
            do_sample: sampling,
            max_new_tokens: u32::try_from(*config.max_new_tokens()).unwrap_or(u32::MAX),
            temperature: sampling.then_some(*config.temperature()),
            top_p: (sampling && *config.top_p() < 1.0).then_some(*config.top_p()),
            repetition_penalty: Some(*config.repetition_penalty()),
            seed: sampling.then_some(*config.seed()),
            return_full_text: false,
        }
    }
}

/// One generated sequence.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct TgiGeneration {
    /// Generated text
    generated_text: String,
}

/// Response body of `POST /generate`.
///
/// TGI answers with a single object; the hosted Inference API wraps the
/// same object in an array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TgiResponse {
    /// `{"generated_text": ...}`
    Single(TgiGeneration),
    /// `[{"generated_text": ...}, ...]`
    Batch(Vec<TgiGeneration>),
}

impl TgiResponse {
    /// Text of the first generated sequence.
    pub fn into_text(self) -> Option<String> {
        match self {
            TgiResponse::Single(generation) => Some(generation.generated_text),
            TgiResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|generation| generation.generated_text),
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TgiErrorBody {
    pub error: String,
}
