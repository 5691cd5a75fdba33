//! Generation backends and tokenizers for Vasari.
//!
//! Every backend implements [`TextGenerator`]: given a rendered prompt and
//! the run's [`GenerationConfig`](vasari_core::GenerationConfig), it checks
//! the prompt against the token budget, sample-decodes, and returns only
//! the response text.
//!
//! - [`TgiGenerator`] talks to a local text-generation-inference server.
//! - `CandleGenerator` (feature `candle`) runs the model in-process.

mod device;
mod generator;
mod tokenizer;
mod tgi;

#[cfg(feature = "candle")]
mod candle;

pub use device::DeviceKind;
pub use generator::{TextGenerator, check_prompt_budget, select_generated_tokens};
pub use tgi::{
    TgiGeneration, TgiGenerator, TgiParameters, TgiParametersBuilder, TgiRequest,
    TgiRequestBuilder, TgiResponse,
};
pub use tokenizer::{HfTokenizer, TiktokenCounter, TokenCounter};

#[cfg(feature = "candle")]
pub use candle::{CandleGenerator, CandleOptions, CandleOptionsBuilder};
