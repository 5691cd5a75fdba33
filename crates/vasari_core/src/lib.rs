//! Core data types for the Vasari batch generation tool.
//!
//! This crate provides the dialog records read from and written back to the
//! JSON dataset, the sampling configuration shared by every backend, and the
//! logging/metrics bootstrap used by the binary.

mod dialog;
mod generation_config;
mod observability;

pub use dialog::{Dialog, Turn};
pub use generation_config::{
    DEFAULT_MAX_NEW_TOKENS, DEFAULT_MAX_PROMPT_TOKENS, DEFAULT_REPETITION_PENALTY, DEFAULT_SEED,
    DEFAULT_TEMPERATURE, DEFAULT_TOP_P, GenerationConfig, GenerationConfigBuilder,
    T5_REPETITION_PENALTY,
};
pub use observability::{LogFormat, MetricsExporter, MetricsGuard, init_metrics, init_tracing};
