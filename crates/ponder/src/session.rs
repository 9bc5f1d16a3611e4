//! In-memory chat history for one session.
//!
//! Append-only while a session runs; the only other mutation is a wholesale
//! reset back to a single system message. Resets bump an epoch counter so a
//! completion that was in flight when the reset happened can never append
//! into the new history.

use crate::models::message::Message;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Think step-by-step before answering.";

#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<Message>,
    epoch: u64,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let messages = vec![Message::system(system_prompt.clone())];
        ChatSession {
            system_prompt,
            messages,
            epoch: 0,
        }
    }

    /// Identifies the current history generation. Captured at the start of
    /// a turn and checked again on commit.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Full history, system message included, for building request payloads.
    pub fn request_messages(&self) -> &[Message] {
        &self.messages
    }

    /// History as shown to the user: everything but the leading system
    /// message.
    pub fn display_messages(&self) -> &[Message] {
        &self.messages[1..]
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append the finished assistant message, but only if the history has
    /// not been reset since `epoch` was captured. Returns whether the
    /// append happened.
    pub fn append_assistant(&mut self, epoch: u64, content: impl Into<String>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.messages.push(Message::assistant(content));
        true
    }

    /// Replace the history wholesale with a fresh system message.
    pub fn reset(&mut self) {
        self.messages = vec![Message::system(self.system_prompt.clone())];
        self.epoch += 1;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        ChatSession::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ChatSession {
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        // A session always holds at least the system message.
        self.messages.len() <= 1
    }
}
