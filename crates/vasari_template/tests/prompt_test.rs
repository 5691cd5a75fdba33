//! Tests for template rendering and role assignment.

use vasari_core::Turn;
use vasari_template::{
    RolePolicy, SeparatorStyle, TEMPLATE_NAMES, conversation_template_by_name,
    conversation_template_for, dialog_to_prompt,
};

fn vicuna() -> vasari_template::ConversationTemplate {
    conversation_template_by_name("vicuna_v1.1").expect("registered template")
}

#[test]
fn test_alternation_starts_with_first_role() {
    let turns = vec![Turn::new("Hi"), Turn::new("Hello!"), Turn::new("How are you?")];
    let prompt = dialog_to_prompt(vicuna(), &turns, RolePolicy::Alternate);

    assert!(prompt.starts_with("A chat between a curious user"));
    assert!(prompt.ends_with("USER: Hi ASSISTANT: Hello!</s>USER: How are you? ASSISTANT:"));
}

#[test]
fn test_alternation_ignores_input_roles() {
    let turns = vec![
        Turn::with_role("I am the assistant", "assistant"),
        Turn::with_role("I am the user", "user"),
    ];
    let prompt = dialog_to_prompt(vicuna(), &turns, RolePolicy::Alternate);

    assert!(prompt.contains("USER: I am the assistant"));
    assert!(prompt.contains("ASSISTANT: I am the user"));
    // Even turn count leaves the second role twice in a row.
    assert!(prompt.ends_with("ASSISTANT: I am the user</s>ASSISTANT:"));
}

#[test]
fn test_from_input_honors_roles() {
    let turns = vec![
        Turn::with_role("Be terse.", "system"),
        Turn::with_role("I am the assistant", "assistant"),
        Turn::with_role("I am the user", "user"),
    ];
    let prompt = dialog_to_prompt(vicuna(), &turns, RolePolicy::FromInput);

    assert!(prompt.starts_with("Be terse. "));
    assert!(prompt.contains("ASSISTANT: I am the assistant"));
    assert!(prompt.ends_with("USER: I am the user</s>ASSISTANT:"));
}

#[test]
fn test_from_input_falls_back_to_alternation() {
    let turns = vec![Turn::new("first"), Turn::with_role("second", "narrator")];
    let alternate = dialog_to_prompt(vicuna(), &turns, RolePolicy::Alternate);
    let from_input = dialog_to_prompt(vicuna(), &turns, RolePolicy::FromInput);
    assert_eq!(alternate, from_input);
}

#[test]
fn test_fresh_template_per_dialog() {
    let base = vicuna();
    let first = dialog_to_prompt(base.clone(), &[Turn::new("one")], RolePolicy::Alternate);
    let second = dialog_to_prompt(base.clone(), &[Turn::new("two")], RolePolicy::Alternate);

    assert!(!second.contains("one"));
    assert!(first.contains("one"));
    assert!(base.messages().is_empty());
}

#[test]
fn test_llama2_rendering() {
    let template = conversation_template_by_name("llama-2").expect("registered template");
    let turns = vec![Turn::new("Hi"), Turn::new("Hello!"), Turn::new("Bye")];
    let prompt = dialog_to_prompt(template, &turns, RolePolicy::Alternate);
    assert_eq!(prompt, "[INST] Hi [/INST] Hello! </s><s>[INST] Bye [/INST]");
}

#[test]
fn test_llama2_with_system_message() {
    let template = conversation_template_by_name("llama-2").expect("registered template");
    let turns = vec![Turn::with_role("Be kind.", "system"), Turn::new("Hi")];
    let prompt = dialog_to_prompt(template, &turns, RolePolicy::FromInput);
    assert_eq!(prompt, "[INST] <<SYS>>\nBe kind.\n<</SYS>>\n\nHi [/INST]");
}

#[test]
fn test_chatml_rendering() {
    let template = conversation_template_by_name("chatml").expect("registered template");
    let prompt = dialog_to_prompt(template, &[Turn::new("Hi")], RolePolicy::Alternate);
    assert_eq!(
        prompt,
        "<|im_start|>system\nYou are a helpful assistant.<|im_end|>\n\
         <|im_start|>user\nHi<|im_end|>\n<|im_start|>assistant\n"
    );
}

#[test]
fn test_raw_template_concatenates() {
    let template = conversation_template_by_name("raw").expect("registered template");
    let prompt = dialog_to_prompt(template, &[Turn::new("Once upon a time")], RolePolicy::Alternate);
    assert_eq!(prompt, "Once upon a time");
}

#[test]
fn test_model_path_matching() {
    assert_eq!(conversation_template_for("lmsys/vicuna-7b-v1.5").name(), "vicuna_v1.1");
    assert_eq!(conversation_template_for("lmsys/fastchat-t5-3b-v1.0").name(), "vicuna_v1.1");
    assert_eq!(conversation_template_for("meta-llama/Llama-2-7b-chat-hf").name(), "llama-2");
    assert_eq!(conversation_template_for("mistralai/Mistral-7B-Instruct-v0.2").name(), "mistral");
    assert_eq!(conversation_template_for("Qwen/Qwen1.5-7B-Chat").name(), "chatml");
    assert_eq!(conversation_template_for("/models/unknown").name(), "zero_shot");
}

#[test]
fn test_every_registered_name_resolves() {
    for name in TEMPLATE_NAMES {
        let template = conversation_template_by_name(name).expect("registered template");
        assert_eq!(template.name(), name);
    }
    assert!(conversation_template_by_name("pirate").is_err());
}

#[test]
fn test_separator_style_names() {
    assert_eq!(SeparatorStyle::AddColonTwo.to_string(), "add-colon-two");
    assert_eq!(RolePolicy::FromInput.to_string(), "from-input");
    assert_eq!("alternate".parse::<RolePolicy>().ok(), Some(RolePolicy::Alternate));
}
