//! Conversation state for the AI helper.

use serde::{Deserialize, Serialize};

use crate::types::Story;

pub const HELPER_FAILURE_TEXT: &str = "Sorry, there was an error getting a response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperMessage {
    pub speaker: Speaker,
    pub text: String,
}

/// Ordered prompt/response transcript. At most one prompt awaits a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<HelperMessage>,
    awaiting_reply: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[HelperMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Records a prompt. Returns the trimmed prompt to send, or `None` when the
    /// prompt is blank or a reply is still pending.
    pub fn push_prompt(&mut self, prompt: &str) -> Option<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() || self.awaiting_reply {
            return None;
        }
        self.messages.push(HelperMessage {
            speaker: Speaker::User,
            text: prompt.to_string(),
        });
        self.awaiting_reply = true;
        Some(prompt.to_string())
    }

    pub fn push_reply(&mut self, reply: &str) {
        self.messages.push(HelperMessage {
            speaker: Speaker::Assistant,
            text: reply.to_string(),
        });
        self.awaiting_reply = false;
    }

    pub fn push_failure(&mut self) {
        self.push_reply(HELPER_FAILURE_TEXT);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.awaiting_reply = false;
    }
}

/// Summary text sent along with every helper prompt.
pub fn summary_context(stories: &[Story]) -> String {
    stories
        .iter()
        .map(|s| format!("**{}:** {}", s.title.trim(), s.summary.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
