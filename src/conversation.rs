use chrono::{DateTime, Local};

use crate::agent::AgentReply;

/// Seed message shown before the user has typed anything.
pub const GREETING: &str = "👋 Hello! I can generate posts for you. Type something!";

/// Shown when the agent answered but produced no text.
pub const NO_RESPONSE_FALLBACK: &str = "⚠️ Sorry, I couldn’t generate a response.";

/// Shown when the agent call failed entirely.
pub const CONNECTION_ERROR_FALLBACK: &str = "⚠️ Error connecting to backend.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the transcript. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub image: Option<Vec<u8>>,
    pub timestamp: DateTime<Local>,
}

/// Emitted by a transition so the UI layer can react (snap the scroll,
/// refocus the input) without the state machine knowing about rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEvent {
    UserMessageAppended,
    BotMessageAppended,
}

/// Append-only message log plus the single pending-request flag.
///
/// All mutation goes through the transition methods below; callers only
/// ever read the log. Ids are assigned here and are strictly increasing
/// for the lifetime of the session.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: bool,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            pending: false,
            next_id: 1,
        }
    }

    /// Fresh conversation seeded with the bot greeting.
    pub fn with_greeting() -> Self {
        let mut conversation = Self::new();
        conversation.push(Sender::Bot, GREETING.to_string(), None);
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Submit user input. Rejected (no state change) when the trimmed text
    /// is empty or a request is already in flight; at most one request may
    /// be pending at a time.
    pub fn submit(&mut self, input: &str) -> Option<ConversationEvent> {
        let text = input.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        self.push(Sender::User, text.to_string(), None);
        self.pending = true;
        Some(ConversationEvent::UserMessageAppended)
    }

    /// Apply a successful agent reply: exactly one bot message, falling back
    /// to a fixed text when the reply carried none. Image data rides along
    /// on the same message. Always clears `pending`.
    pub fn reply_received(&mut self, reply: AgentReply) -> ConversationEvent {
        let text = match reply.text {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESPONSE_FALLBACK.to_string(),
        };
        self.push(Sender::Bot, text, reply.image);
        self.pending = false;
        ConversationEvent::BotMessageAppended
    }

    /// Apply a failed agent call: one bot message with the connection-error
    /// fallback. Always clears `pending`.
    pub fn reply_failed(&mut self) -> ConversationEvent {
        self.push(Sender::Bot, CONNECTION_ERROR_FALLBACK.to_string(), None);
        self.pending = false;
        ConversationEvent::BotMessageAppended
    }

    /// Most recent bot message, if any.
    pub fn last_bot_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.sender == Sender::Bot)
    }

    /// Most recent message that carries image data, if any.
    pub fn latest_image(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.image.is_some())
    }

    fn push(&mut self, sender: Sender, text: String, image: Option<Vec<u8>>) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            sender,
            text,
            image,
            timestamp: Local::now(),
        });
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the message at `index` renders grouped with its predecessor:
/// same sender as the message directly above it. Display-only; suppresses
/// the avatar/name label for runs of messages from one side.
pub fn is_grouped(messages: &[Message], index: usize) -> bool {
    if index == 0 || index >= messages.len() {
        return false;
    }
    messages[index].sender == messages[index - 1].sender
}
