//! Conversation template state and rendering.

use derive_getters::Getters;

/// How turns are joined into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SeparatorStyle {
    /// `ROLE: message<sep>` for every turn
    AddColonSingle,
    /// `ROLE: message` alternating `sep` and `sep2`
    AddColonTwo,
    /// `ROLEmessage<sep>`
    NoColonSingle,
    /// `ROLE\nmessage<sep>`
    AddNewLineSingle,
    /// `[INST] ... [/INST]` framing
    Llama2,
    /// `<|im_start|>role\nmessage<|im_end|>` framing
    ChatMl,
}

/// A conversation template with its accumulated turns.
///
/// Templates are cheap to clone; callers start every dialog from a clean
/// copy so no turns leak between dialogs.
///
/// # Examples
///
/// ```
/// use vasari_template::conversation_template_by_name;
///
/// let mut conv = conversation_template_by_name("vicuna_v1.1").unwrap();
/// let user = conv.roles().0.clone();
/// let assistant = conv.roles().1.clone();
/// conv.append_message(user, Some("Hi".to_string()));
/// conv.append_message(assistant, None);
/// assert!(conv.get_prompt().ends_with("USER: Hi ASSISTANT:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ConversationTemplate {
    /// Registered template name
    name: String,
    /// System prompt; may be empty
    system_message: String,
    /// Format string wrapping the system prompt (`{system_message}` placeholder)
    system_template: String,
    /// First and second role labels
    roles: (String, String),
    /// Accumulated (role, message) turns; `None` marks the turn to generate
    messages: Vec<(String, Option<String>)>,
    /// Joining convention
    sep_style: SeparatorStyle,
    /// Primary separator
    sep: String,
    /// Secondary separator for two-separator styles
    sep2: Option<String>,
    /// Text at which generation should stop, if any
    stop_str: Option<String>,
}

impl ConversationTemplate {
    /// Creates an empty template.
    pub fn new(
        name: impl Into<String>,
        roles: (&str, &str),
        sep_style: SeparatorStyle,
        sep: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system_message: String::new(),
            system_template: "{system_message}".to_string(),
            roles: (roles.0.to_string(), roles.1.to_string()),
            messages: Vec::new(),
            sep_style,
            sep: sep.into(),
            sep2: None,
            stop_str: None,
        }
    }

    /// Sets the system prompt.
    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    /// Sets the wrapper around the system prompt.
    pub fn with_system_template(mut self, system_template: impl Into<String>) -> Self {
        self.system_template = system_template.into();
        self
    }

    /// Sets the secondary separator.
    pub fn with_sep2(mut self, sep2: impl Into<String>) -> Self {
        self.sep2 = Some(sep2.into());
        self
    }

    /// Sets the stop string.
    pub fn with_stop_str(mut self, stop_str: impl Into<String>) -> Self {
        self.stop_str = Some(stop_str.into());
        self
    }

    /// Replaces the system prompt in place.
    pub fn set_system_message(&mut self, system_message: impl Into<String>) {
        self.system_message = system_message.into();
    }

    /// Appends a turn. `None` leaves an open slot for the model to fill.
    pub fn append_message(&mut self, role: impl Into<String>, message: Option<String>) {
        self.messages.push((role.into(), message));
    }

    fn system_prompt(&self) -> String {
        self.system_template
            .replace("{system_message}", &self.system_message)
    }

    fn sep2_or_sep(&self) -> &str {
        self.sep2.as_deref().unwrap_or(&self.sep)
    }

    /// Renders the accumulated turns into a prompt string.
    pub fn get_prompt(&self) -> String {
        let system = self.system_prompt();
        let mut ret = String::new();
        match self.sep_style {
            SeparatorStyle::AddColonSingle => {
                ret.push_str(&system);
                ret.push_str(&self.sep);
                for (role, message) in &self.messages {
                    match message {
                        Some(text) => {
                            ret.push_str(&format!("{}: {}{}", role, text, self.sep));
                        }
                        None => ret.push_str(&format!("{}:", role)),
                    }
                }
            }
            SeparatorStyle::AddColonTwo => {
                let seps = [self.sep.as_str(), self.sep2_or_sep()];
                ret.push_str(&system);
                ret.push_str(seps[0]);
                for (i, (role, message)) in self.messages.iter().enumerate() {
                    match message {
                        Some(text) => {
                            ret.push_str(&format!("{}: {}{}", role, text, seps[i % 2]));
                        }
                        None => ret.push_str(&format!("{}:", role)),
                    }
                }
            }
            SeparatorStyle::NoColonSingle => {
                ret.push_str(&system);
                for (role, message) in &self.messages {
                    ret.push_str(role);
                    if let Some(text) = message {
                        ret.push_str(text);
                        ret.push_str(&self.sep);
                    }
                }
            }
            SeparatorStyle::AddNewLineSingle => {
                if !system.is_empty() {
                    ret.push_str(&system);
                    ret.push_str(&self.sep);
                }
                for (role, message) in &self.messages {
                    ret.push_str(role);
                    ret.push('\n');
                    if let Some(text) = message {
                        ret.push_str(text);
                        ret.push_str(&self.sep);
                    }
                }
            }
            SeparatorStyle::Llama2 => {
                let seps = [self.sep.as_str(), self.sep2_or_sep()];
                if self.system_message.is_empty() {
                    ret.push_str("[INST] ");
                } else {
                    ret.push_str(&system);
                }
                for (i, (role, message)) in self.messages.iter().enumerate() {
                    match message {
                        // The opening tag is already part of the system block.
                        Some(text) if i == 0 => {
                            ret.push_str(text);
                            ret.push(' ');
                        }
                        Some(text) => {
                            ret.push_str(&format!("{} {}{}", role, text, seps[i % 2]));
                        }
                        None => ret.push_str(role),
                    }
                }
            }
            SeparatorStyle::ChatMl => {
                if !self.system_message.is_empty() {
                    ret.push_str(&system);
                    ret.push_str(&self.sep);
                    ret.push('\n');
                }
                for (role, message) in &self.messages {
                    ret.push_str(role);
                    ret.push('\n');
                    if let Some(text) = message {
                        ret.push_str(text);
                        ret.push_str(&self.sep);
                        ret.push('\n');
                    }
                }
            }
        }
        ret
    }
}
