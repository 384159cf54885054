//! Wraps teloxide::Bot and implements [`handwitch_core::Bot`]. Production code sends messages via
//! Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use handwitch_core::{Bot as CoreBot, Chat, HandwitchError, Keyboard, Result};
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that applies the configured parse mode to every message.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
    parse_mode: Option<ParseMode>,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot, parse_mode: Option<ParseMode>) -> Self {
        Self { bot, parse_mode }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

/// Reply keyboard that shrinks to fit its buttons.
pub fn reply_keyboard(keyboard: &Keyboard) -> KeyboardMarkup {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>());
    KeyboardMarkup::new(rows).resize_keyboard()
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(chat.id), text)
            .reply_markup(KeyboardRemove::new());
        if let Some(mode) = self.parse_mode {
            request = request.parse_mode(mode);
        }
        request
            .await
            .map_err(|e| HandwitchError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_keyboard(&self, chat: &Chat, text: &str, keyboard: &Keyboard) -> Result<()> {
        debug!(chat_id = chat.id, buttons = keyboard.labels().count(), "Sending keyboard");
        let mut request = self
            .bot
            .send_message(ChatId(chat.id), text)
            .reply_markup(reply_keyboard(keyboard));
        if let Some(mode) = self.parse_mode {
            request = request.parse_mode(mode);
        }
        request
            .await
            .map_err(|e| HandwitchError::Bot(e.to_string()))?;
        Ok(())
    }
}
