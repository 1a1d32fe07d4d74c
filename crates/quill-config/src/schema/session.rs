use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Quill, a creative writing assistant. \
Help the author develop stories, characters, outlines, and settings. \
Answer concretely and keep the author's voice.";

/// Conversation session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// System instruction sent with every turn.
    pub system_prompt: String,
    /// Stream responses token by token in the CLI.
    pub stream: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            stream: true,
        }
    }
}
