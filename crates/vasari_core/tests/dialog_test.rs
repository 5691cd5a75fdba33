//! Tests for dialog (de)serialization.

use serde_json::json;
use vasari_core::{Dialog, Turn};

#[test]
fn test_pending_dialog_has_no_generation_key() {
    let dialogs: Vec<Dialog> =
        serde_json::from_str(r#"[{"messages":[{"content":"Hi"}]}]"#).expect("valid input");
    assert!(!dialogs[0].is_done());

    let rendered = serde_json::to_string(&dialogs).expect("serializable");
    assert_eq!(rendered, r#"[{"messages":[{"content":"Hi"}]}]"#);
}

#[test]
fn test_generation_is_appended_after_messages() {
    let mut dialogs: Vec<Dialog> =
        serde_json::from_str(r#"[{"messages":[{"content":"Hi"}]}]"#).expect("valid input");
    dialogs[0].set_generation("Hello!");

    let rendered = serde_json::to_string(&dialogs).expect("serializable");
    assert_eq!(
        rendered,
        r#"[{"messages":[{"content":"Hi"}],"generation":"Hello!"}]"#
    );
}

#[test]
fn test_unknown_keys_survive_rewrite() {
    let input = json!([{
        "id": "dlg-7",
        "messages": [
            {"content": "What is 2+2?", "role": "user", "lang": "en"},
            {"content": "4", "role": "assistant"}
        ],
        "generation": "done already"
    }]);

    let dialogs: Vec<Dialog> = serde_json::from_value(input.clone()).expect("valid input");
    assert!(dialogs[0].is_done());
    assert_eq!(dialogs[0].fields().get("id"), Some(&json!("dlg-7")));
    assert_eq!(dialogs[0].generation(), Some("done already"));
    assert_eq!(dialogs[0].messages()[0].role(), Some("user"));

    let output = serde_json::to_value(&dialogs).expect("serializable");
    assert_eq!(output, input);
}

#[test]
fn test_turn_without_content_is_rejected() {
    let result: Result<Vec<Dialog>, _> =
        serde_json::from_str(r#"[{"messages":[{"role":"user"}]}]"#);
    assert!(result.is_err());
}

#[test]
fn test_non_string_role_is_ignored() {
    let turn: Turn = serde_json::from_value(json!({"content": "x", "role": 3})).expect("valid");
    assert_eq!(turn.role(), None);
    assert_eq!(turn.extra().get("role"), Some(&json!(3)));
}

#[test]
fn test_constructors() {
    let dialog = Dialog::new(vec![Turn::new("a"), Turn::with_role("b", "assistant")]);
    assert_eq!(dialog.messages().len(), 2);
    assert_eq!(dialog.messages()[1].role(), Some("assistant"));
    assert!(dialog.generation().is_none());
}

#[test]
fn test_null_generation_counts_as_done_and_is_kept() {
    let input = r#"[{"messages":[{"content":"a"}],"generation":null}]"#;
    let dialogs: Vec<Dialog> = serde_json::from_str(input).expect("valid input");
    assert!(dialogs[0].is_done());
    assert_eq!(dialogs[0].generation(), None);
    assert_eq!(serde_json::to_string(&dialogs).expect("serializable"), input);
}

#[test]
fn test_key_order_survives_rewrite() {
    let input = r#"[{"id":7,"messages":[{"role":"user","content":"Hi","lang":"en"}],"generation":"kept","tag":"x"}]"#;
    let dialogs: Vec<Dialog> = serde_json::from_str(input).expect("valid input");
    assert_eq!(serde_json::to_string(&dialogs).expect("serializable"), input);
}

#[test]
fn test_dialog_without_messages_is_rejected() {
    let result: Result<Vec<Dialog>, _> = serde_json::from_str(r#"[{"generation":"x"}]"#);
    assert!(result.is_err());
}

#[test]
fn test_new_dialog_serializes_turns() {
    let dialog = Dialog::new(vec![Turn::with_role("Hi", "user")]);
    assert_eq!(
        serde_json::to_string(&dialog).expect("serializable"),
        r#"{"messages":[{"content":"Hi","role":"user"}]}"#
    );
}
