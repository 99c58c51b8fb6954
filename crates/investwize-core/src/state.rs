//! UI-agnostic conversation state
//!
//! The conversation is an append-only list of messages that always opens
//! with the coach's welcome message, plus the flag that marks a reply in
//! flight. Any front end owns exactly one `Conversation` and drives it
//! through `submit` and `complete`/`fail`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str = "Welcome to InvestWize! 🪙 I'm your AI Investment Coach, here to help you master your finances. Whether you need help with budgeting, expense tracking, investment strategies, or building wealth, I'm here to guide you every step of the way.\n\nWhat financial challenge can I help you solve today? I can assist with:\n• Smart budgeting & expense analysis\n• Investment recommendations (ETFs, stocks, bonds)\n• Savings strategies & goal planning\n• Debt management & optimization\n• Financial planning for your future";

/// Starter questions offered while only the welcome message is shown
pub const QUICK_QUESTIONS: [&str; 4] = [
    "How to start budgeting?",
    "Best investment for beginners?",
    "Pay off debt or invest?",
    "Build emergency fund?",
];

/// A chat message in the coaching conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: the welcome message is always present
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True until the user has sent anything
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1
    }

    /// Append a message. User messages with blank content are rejected.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        if message.role == ChatRole::User && message.content.trim().is_empty() {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Record the user's input and mark a reply as pending.
    ///
    /// Returns `None` without touching state when the input is blank or a
    /// reply is already in flight.
    pub fn submit(&mut self, input: &str) -> Option<ChatMessage> {
        let content = input.trim();
        if content.is_empty() || self.pending {
            return None;
        }

        let message = ChatMessage::user(content);
        if !self.append(message.clone()) {
            return None;
        }
        self.pending = true;
        Some(message)
    }

    /// Append the assistant's reply and clear the pending flag
    pub fn complete(&mut self, reply: impl Into<String>) {
        self.append(ChatMessage::assistant(reply));
        self.pending = false;
    }

    /// Clear the pending flag without a reply
    pub fn fail(&mut self) {
        self.pending = false;
    }
}
