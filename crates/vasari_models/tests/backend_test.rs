//! Tests for parameter mapping, token counting and output selection.

use vasari_core::GenerationConfig;
use vasari_models::{
    DeviceKind, TgiParameters, TiktokenCounter, TokenCounter, check_prompt_budget,
    select_generated_tokens,
};

#[test]
fn test_parameters_from_default_config() {
    let params = TgiParameters::from_config(&GenerationConfig::default());
    assert!(*params.do_sample());
    assert_eq!(*params.max_new_tokens(), 512);
    assert_eq!(*params.temperature(), Some(0.7));
    assert_eq!(*params.top_p(), Some(0.9));
    assert_eq!(*params.repetition_penalty(), Some(1.0));
    assert_eq!(*params.seed(), Some(299_792_458));
    assert!(!*params.return_full_text());
}

#[test]
fn test_zero_temperature_is_greedy() {
    let config = GenerationConfig::builder()
        .temperature(0.0f32)
        .build()
        .unwrap();
    let params = TgiParameters::from_config(&config);
    assert!(!*params.do_sample());
    assert_eq!(*params.temperature(), None);
    assert_eq!(*params.top_p(), None);
    assert_eq!(*params.seed(), None);

    let json = serde_json::to_value(&params).unwrap();
    assert!(json.get("temperature").is_none());
    assert!(json.get("top_p").is_none());
}

#[test]
fn test_full_top_p_is_omitted() {
    let config = GenerationConfig::builder().top_p(1.0f32).build().unwrap();
    let params = TgiParameters::from_config(&config);
    assert_eq!(*params.top_p(), None);
    assert_eq!(*params.temperature(), Some(0.7));
}

#[test]
fn test_tiktoken_counts_tokens() {
    let counter = TiktokenCounter::cl100k().unwrap();
    assert_eq!(counter.count_tokens("").unwrap(), 0);
    assert_eq!(counter.count_tokens("hello world").unwrap(), 2);
    assert_eq!(counter.name(), "cl100k_base");
}

#[test]
fn test_budget_boundary() {
    assert!(check_prompt_budget(0, 1).is_ok());
    let err = check_prompt_budget(2048, 1024).unwrap_err();
    assert!(err.is_prompt_too_long());
}

#[test]
fn test_decoder_only_output_shorter_than_prompt_is_empty() {
    assert!(select_generated_tokens(&[1, 2], 3, false).is_empty());
}

#[test]
fn test_device_kind_parsing() {
    assert_eq!(DeviceKind::default(), DeviceKind::Cuda);
    assert_eq!("cpu".parse::<DeviceKind>().unwrap(), DeviceKind::Cpu);
    assert_eq!("CUDA".parse::<DeviceKind>().unwrap(), DeviceKind::Cuda);
    assert_eq!("mps".parse::<DeviceKind>().unwrap(), DeviceKind::Metal);
    assert_eq!(DeviceKind::Metal.to_string(), "metal");
    assert!("tpu".parse::<DeviceKind>().is_err());
    assert!(!DeviceKind::Cpu.is_accelerator());
}
