//! Turning a dialog's turns into a single prompt string.

use crate::ConversationTemplate;
use vasari_core::Turn;

/// How turns are assigned to the template's two roles.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RolePolicy {
    /// Strict alternation starting from the first role; input roles are ignored
    #[default]
    Alternate,
    /// Use the turn's `role` key where recognised, alternate otherwise
    FromInput,
}

/// Which of the template's roles an input role label maps to.
enum Slot {
    First,
    Second,
    System,
}

fn slot_for(role: &str) -> Option<Slot> {
    match role.to_ascii_lowercase().as_str() {
        "user" | "human" => Some(Slot::First),
        "assistant" | "gpt" | "bot" | "model" => Some(Slot::Second),
        "system" => Some(Slot::System),
        _ => None,
    }
}

/// Renders `turns` through `template`, leaving an open slot for the second
/// role to respond.
///
/// With [`RolePolicy::Alternate`] an even number of turns ends with the
/// second role twice in a row, once filled and once open. Input that
/// already interleaves roles correctly renders the same under both
/// policies.
///
/// # Examples
///
/// ```
/// use vasari_core::Turn;
/// use vasari_template::{RolePolicy, conversation_template_by_name, dialog_to_prompt};
///
/// let template = conversation_template_by_name("zero_shot").unwrap();
/// let prompt = dialog_to_prompt(template, &[Turn::new("Hi")], RolePolicy::Alternate);
/// assert!(prompt.ends_with("### Human: Hi\n### Assistant:"));
/// ```
pub fn dialog_to_prompt(
    mut template: ConversationTemplate,
    turns: &[Turn],
    policy: RolePolicy,
) -> String {
    let (first, second) = template.roles().clone();
    let mut position = 0usize;

    for turn in turns {
        let slot = match policy {
            RolePolicy::Alternate => None,
            RolePolicy::FromInput => turn.role().and_then(slot_for),
        };
        let role = match slot {
            Some(Slot::System) => {
                template.set_system_message(turn.content().clone());
                continue;
            }
            Some(Slot::First) => &first,
            Some(Slot::Second) => &second,
            None if position % 2 == 0 => &first,
            None => &second,
        };
        template.append_message(role.clone(), Some(turn.content().clone()));
        position += 1;
    }

    template.append_message(second, None);
    template.get_prompt()
}
