//! Conversation templates and prompt building for Vasari.
//!
//! A [`ConversationTemplate`] accumulates turns under two role labels and
//! renders them in a model-specific format. [`dialog_to_prompt`] feeds a
//! dialog's turns into a fresh template according to a [`RolePolicy`].

mod conversation;
mod prompt;
mod registry;

pub use conversation::{ConversationTemplate, SeparatorStyle};
pub use prompt::{RolePolicy, dialog_to_prompt};
pub use registry::{TEMPLATE_NAMES, conversation_template_by_name, conversation_template_for};
