//! Tests for sampling configuration defaults and validation.

use vasari_core::{GenerationConfig, T5_REPETITION_PENALTY};

#[test]
fn test_defaults_match_documented_values() {
    let config = GenerationConfig::default();
    assert_eq!(*config.temperature(), 0.7);
    assert_eq!(*config.repetition_penalty(), 1.0);
    assert_eq!(*config.max_new_tokens(), 512);
    assert_eq!(*config.top_p(), 0.9);
    assert_eq!(*config.max_prompt_tokens(), 1024);
    assert!(config.check().is_ok());
}

#[test]
fn test_t5_model_raises_default_penalty() {
    let config = GenerationConfig::default().adjusted_for_model("lmsys/fastchat-t5-3b-v1.0");
    assert_eq!(*config.repetition_penalty(), T5_REPETITION_PENALTY);
}

#[test]
fn test_t5_match_ignores_case() {
    let config = GenerationConfig::default().adjusted_for_model("google/Flan-T5-large");
    assert_eq!(*config.repetition_penalty(), T5_REPETITION_PENALTY);
}

#[test]
fn test_explicit_penalty_is_kept_for_t5() {
    let config = GenerationConfig::builder()
        .repetition_penalty(1.05)
        .build()
        .expect("valid config")
        .adjusted_for_model("lmsys/fastchat-t5-3b-v1.0");
    assert_eq!(*config.repetition_penalty(), 1.05);
}

#[test]
fn test_other_models_keep_default_penalty() {
    let config = GenerationConfig::default().adjusted_for_model("lmsys/vicuna-7b-v1.5");
    assert_eq!(*config.repetition_penalty(), 1.0);
}

#[test]
fn test_builder_rejects_invalid_values() {
    assert!(GenerationConfig::builder().top_p(0.0).build().is_err());
    assert!(GenerationConfig::builder().temperature(-1.0).build().is_err());
    assert!(GenerationConfig::builder().max_new_tokens(0_usize).build().is_err());
    assert!(GenerationConfig::builder().temperature(0.0).build().is_ok());
}

#[test]
fn test_deserializes_partial_table() {
    let config: GenerationConfig = toml_like(r#"{"temperature": 0.1, "max_new_tokens": 64}"#);
    assert_eq!(*config.temperature(), 0.1);
    assert_eq!(*config.max_new_tokens(), 64);
    assert_eq!(*config.top_p(), 0.9);
}

fn toml_like(json: &str) -> GenerationConfig {
    serde_json::from_str(json).expect("valid partial config")
}
