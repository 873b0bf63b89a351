use std::path::Path;
use async_trait::async_trait;
use crate::errors::Result;

pub type ChatId = i64;
pub type MessageId = i32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Inline keyboard, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.payload.as_str())
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    async fn send_keyboard(&self, chat_id: ChatId, text: &str, keyboard: &Keyboard) -> Result<()>;

    /// Replaces the text (and keyboard, when given) of an earlier message.
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<()>;

    async fn send_audio(&self, chat_id: ChatId, file: &Path) -> Result<()>;

    async fn send_video(&self, chat_id: ChatId, file: &Path) -> Result<()>;

    async fn send_document(&self, chat_id: ChatId, file: &Path) -> Result<()>;
}
