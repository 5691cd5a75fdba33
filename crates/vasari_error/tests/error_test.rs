//! Tests for error construction and conversion.

use vasari_error::{
    ConfigError, GenerationError, GenerationErrorKind, StorageError, StorageErrorKind,
    VasariError, VasariErrorKind, VasariResult,
};

fn fails_with_budget() -> VasariResult<()> {
    Err(GenerationError::new(GenerationErrorKind::PromptTooLong {
        tokens: 1500,
        max: 1024,
    })
    .into())
}

#[test]
fn test_generation_error_converts_into_vasari_error() {
    let err = fails_with_budget().unwrap_err();
    let generation = err.as_generation().expect("generation error");
    assert!(generation.is_prompt_too_long());
    assert!(err.to_string().contains("1500 tokens"));
}

#[test]
fn test_error_records_caller_location() {
    let err = ConfigError::new("bad flag");
    assert_eq!(err.file, file!());
    assert!(err.line > 0);
}

#[test]
fn test_storage_kind_classifies_missing_file() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let kind = StorageErrorKind::from_read(std::path::Path::new("dialogs.json"), &io);
    assert_eq!(kind, StorageErrorKind::NotFound("dialogs.json".to_string()));

    let err: VasariError = StorageError::new(kind).into();
    assert!(matches!(err.kind(), VasariErrorKind::Storage(_)));
    assert!(err.as_generation().is_none());
}

#[test]
fn test_api_error_display() {
    let err = GenerationError::new(GenerationErrorKind::Api {
        status: 422,
        message: "Input validation error".to_string(),
    });
    let text = format!("{}", err);
    assert!(text.contains("status 422"));
    assert!(!err.is_prompt_too_long());
}

#[test]
fn test_config_error_display_and_source() {
    let err = ConfigError::new("No input file given (--input_path)");
    let text = err.to_string();
    assert!(text.starts_with("Configuration Error: No input file given"));
    assert!(text.contains(file!()));
    assert!(std::error::Error::source(&err).is_none());

    let wrapped: VasariError = err.into();
    assert!(matches!(wrapped.kind(), VasariErrorKind::Config(_)));
}
