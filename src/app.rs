use anyhow::Result;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::agent::{AgentClient, AgentReply};
use crate::conversation::{is_grouped, Conversation, ConversationEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub conversation: Conversation,

    // Input box state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript, for scroll math
    pub chat_width: u16,  // inner width of the transcript, for wrap math
    pub chat_area: Option<Rect>, // for mouse hit-testing (updated during render)

    // Animation state
    pub animation_frame: u8, // 0-2 for the thinking ellipsis

    // Transient footer notice (e.g. after saving an image)
    pub notice: Option<String>,

    // In-flight agent call, at most one
    pub reply_task: Option<JoinHandle<Result<AgentReply>>>,
    pub agent: AgentClient,
}

impl App {
    pub fn new(agent: AgentClient) -> Self {
        Self {
            should_quit: false,
            // The input has focus from the start, like any chat box
            input_mode: InputMode::Editing,
            conversation: Conversation::with_greeting(),

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            animation_frame: 0,
            notice: None,

            reply_task: None,
            agent,
        }
    }

    /// Submit the current input buffer. No-op when the text is blank or a
    /// reply is already outstanding; on success the agent call runs on a
    /// background task and the main loop picks up its result.
    pub fn submit(&mut self) {
        if self.reply_task.is_some() {
            return;
        }

        let Some(event) = self.conversation.submit(&self.input) else {
            return;
        };

        let prompt = self.input.trim().to_string();
        self.input.clear();
        self.cursor = 0;

        let agent = self.agent.clone();
        self.reply_task = Some(tokio::spawn(async move { agent.ask(&prompt).await }));

        self.on_conversation_event(event);
    }

    /// Harvest a finished agent call, if any, and apply the matching
    /// transition. A panicked task counts as a failed call.
    pub async fn poll_reply(&mut self) {
        if !self.reply_task.as_ref().is_some_and(|t| t.is_finished()) {
            return;
        }

        if let Some(task) = self.reply_task.take() {
            let event = match task.await {
                Ok(Ok(reply)) => self.conversation.reply_received(reply),
                Ok(Err(_)) | Err(_) => self.conversation.reply_failed(),
            };
            self.on_conversation_event(event);
        }
    }

    /// Observer hook for state transitions: keep the newest message visible.
    fn on_conversation_event(&mut self, _event: ConversationEvent) {
        self.scroll_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(self.chat_height / 2);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Snap the transcript so the latest message (and the typing indicator,
    /// when pending) is visible. Line estimate mirrors how the transcript is
    /// rendered: label line per ungrouped message, wrapped text, an image
    /// placeholder line, and a timestamp line.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            60
        };

        let messages = self.conversation.messages();
        let mut total_lines: u16 = 0;

        for (idx, msg) in messages.iter().enumerate() {
            if !is_grouped(messages, idx) {
                if idx > 0 {
                    total_lines += 1; // blank separator between sender runs
                }
                total_lines += 1; // sender label
            }
            for line in msg.text.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            if msg.image.is_some() {
                total_lines += 1;
            }
            total_lines += 1; // timestamp
        }

        if self.conversation.is_pending() {
            total_lines += 2; // separator + "Bot is thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines - visible_height;
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Write the most recent image reply to the working directory.
    pub fn save_latest_image(&mut self) {
        let Some(msg) = self.conversation.latest_image() else {
            self.notice = Some("no image to save".to_string());
            return;
        };

        let path = format!("impactai-{}.png", msg.id);
        let bytes = msg.image.as_deref().unwrap_or_default();
        self.notice = Some(match std::fs::write(&path, bytes) {
            Ok(()) => format!("saved {}", path),
            Err(e) => format!("save failed: {}", e),
        });
    }
}
