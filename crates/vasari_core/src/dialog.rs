//! Dialog records as stored in the input/output JSON array.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of a dialog.
///
/// Only `content` is interpreted; every other key (including `role`) is kept
/// as-is so the record survives a rewrite unchanged.
///
/// # Examples
///
/// ```
/// use vasari_core::Turn;
///
/// let turn: Turn = serde_json::from_str(r#"{"content": "Hi", "role": "user"}"#).unwrap();
/// assert_eq!(turn.content(), "Hi");
/// assert_eq!(turn.role(), Some("user"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Turn {
    /// Text of the turn
    content: String,
    /// Any other keys present on the input object
    #[serde(flatten)]
    #[getter(skip)]
    extra: Map<String, Value>,
}

impl Turn {
    /// Creates a turn with no extra keys.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Creates a turn carrying a `role` key.
    pub fn with_role(content: impl Into<String>, role: impl Into<String>) -> Self {
        let mut turn = Self::new(content);
        turn.extra
            .insert("role".to_string(), Value::String(role.into()));
        turn
    }

    /// The `role` key, if present and a string.
    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(Value::as_str)
    }

    /// Keys other than `content`.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

impl From<&Turn> for Value {
    fn from(turn: &Turn) -> Self {
        let mut object = Map::new();
        object.insert("content".to_string(), Value::String(turn.content.clone()));
        for (key, value) in &turn.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// A conversation record: ordered turns plus an optional generated response.
///
/// The input object is kept verbatim, key order included, and written back
/// as-is; only `generation` is ever added. A dialog is done once the
/// `generation` key is present, whatever its value, and done dialogs are
/// never regenerated.
///
/// # Examples
///
/// ```
/// use vasari_core::Dialog;
///
/// let mut dialog: Dialog =
///     serde_json::from_str(r#"{"id":7,"messages":[{"content":"Hi"}],"tag":"x"}"#).unwrap();
/// assert!(!dialog.is_done());
/// dialog.set_generation("Hello!");
/// assert_eq!(
///     serde_json::to_string(&dialog).unwrap(),
///     r#"{"id":7,"messages":[{"content":"Hi"}],"tag":"x","generation":"Hello!"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Dialog {
    /// Parsed view of `messages`
    messages: Vec<Turn>,
    /// The record as read, in input key order
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Dialog {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let messages = fields
            .get("messages")
            .ok_or_else(|| "dialog has no `messages` key".to_string())?;
        let messages: Vec<Turn> = Vec::<Turn>::deserialize(messages)
            .map_err(|e| format!("invalid `messages`: {}", e))?;
        Ok(Self { messages, fields })
    }
}

impl Serialize for Dialog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Dialog {
    /// Creates a pending dialog from its turns.
    pub fn new(messages: Vec<Turn>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            "messages".to_string(),
            Value::Array(messages.iter().map(Value::from).collect()),
        );
        Self { messages, fields }
    }

    /// Ordered turns of the conversation.
    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    /// Whether the record has a `generation` key.
    pub fn is_done(&self) -> bool {
        self.fields.contains_key("generation")
    }

    /// The generated response, if recorded as a string.
    pub fn generation(&self) -> Option<&str> {
        self.fields.get("generation").and_then(Value::as_str)
    }

    /// Records the generated response after the existing keys.
    pub fn set_generation(&mut self, generation: impl Into<String>) {
        self.fields
            .insert("generation".to_string(), Value::String(generation.into()));
    }

    /// Every key of the record, `messages` and `generation` included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
