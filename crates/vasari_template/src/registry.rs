//! Built-in conversation templates and model-path matching.

use crate::{ConversationTemplate, SeparatorStyle};
use vasari_error::{ConfigError, VasariResult};

/// Names accepted by [`conversation_template_by_name`].
pub const TEMPLATE_NAMES: &[&str] = &[
    "vicuna_v1.1",
    "zero_shot",
    "llama-2",
    "mistral",
    "chatml",
    "alpaca",
    "raw",
];

const VICUNA_SYSTEM: &str = "A chat between a curious user and an artificial intelligence assistant. \
The assistant gives helpful, detailed, and polite answers to the user's questions.";

const ZERO_SHOT_SYSTEM: &str = "A chat between a curious human and an artificial intelligence assistant. \
The assistant gives helpful, detailed, and polite answers to the human's questions.";

const ALPACA_SYSTEM: &str = "Below is an instruction that describes a task. \
Write a response that appropriately completes the request.";

/// Returns a fresh template by registered name.
///
/// # Errors
///
/// Returns a [`ConfigError`] listing the known names when `name` is unknown.
pub fn conversation_template_by_name(name: &str) -> VasariResult<ConversationTemplate> {
    let template = match name {
        "vicuna_v1.1" => ConversationTemplate::new(
            "vicuna_v1.1",
            ("USER", "ASSISTANT"),
            SeparatorStyle::AddColonTwo,
            " ",
        )
        .with_system_message(VICUNA_SYSTEM)
        .with_sep2("</s>"),
        "zero_shot" => ConversationTemplate::new(
            "zero_shot",
            ("Human", "Assistant"),
            SeparatorStyle::AddColonSingle,
            "\n### ",
        )
        .with_system_message(ZERO_SHOT_SYSTEM)
        .with_stop_str("###"),
        "llama-2" => ConversationTemplate::new(
            "llama-2",
            ("[INST]", "[/INST]"),
            SeparatorStyle::Llama2,
            " ",
        )
        .with_system_template("[INST] <<SYS>>\n{system_message}\n<</SYS>>\n\n")
        .with_sep2(" </s><s>"),
        "mistral" => ConversationTemplate::new(
            "mistral",
            ("[INST]", "[/INST]"),
            SeparatorStyle::Llama2,
            " ",
        )
        .with_system_template("[INST] {system_message}\n")
        .with_sep2("</s>"),
        "chatml" => ConversationTemplate::new(
            "chatml",
            ("<|im_start|>user", "<|im_start|>assistant"),
            SeparatorStyle::ChatMl,
            "<|im_end|>",
        )
        .with_system_template("<|im_start|>system\n{system_message}")
        .with_system_message("You are a helpful assistant.")
        .with_stop_str("<|im_end|>"),
        "alpaca" => ConversationTemplate::new(
            "alpaca",
            ("### Instruction", "### Response"),
            SeparatorStyle::AddColonTwo,
            "\n\n",
        )
        .with_system_message(ALPACA_SYSTEM)
        .with_sep2("</s>"),
        "raw" => ConversationTemplate::new("raw", ("", ""), SeparatorStyle::NoColonSingle, ""),
        other => {
            return Err(ConfigError::new(format!(
                "Unknown conversation template '{}', expected one of: {}",
                other,
                TEMPLATE_NAMES.join(", ")
            ))
            .into());
        }
    };
    Ok(template)
}

/// Picks the template matching a model path or hub id.
///
/// Matching is a case-insensitive substring test, first hit wins; models
/// that match nothing get the zero-shot template.
#[tracing::instrument]
pub fn conversation_template_for(model_path: &str) -> ConversationTemplate {
    let lowered = model_path.to_lowercase();
    let name = if lowered.contains("vicuna") || lowered.contains("t5") {
        "vicuna_v1.1"
    } else if lowered.contains("llama-2") || lowered.contains("llama2") {
        "llama-2"
    } else if lowered.contains("mistral") || lowered.contains("mixtral") {
        "mistral"
    } else if lowered.contains("qwen") || lowered.contains("chatml") {
        "chatml"
    } else if lowered.contains("alpaca") {
        "alpaca"
    } else {
        "zero_shot"
    };
    tracing::debug!(template = name, "Selected conversation template");

    // Every name above is registered.
    conversation_template_by_name(name).unwrap_or_else(|_| {
        ConversationTemplate::new("raw", ("", ""), SeparatorStyle::NoColonSingle, "")
    })
}
