//! Adapters from Telegram (teloxide) types to handwitch_core types.

use handwitch_core::{Chat, Message, ToCoreMessage, ToCoreUser, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`]. Non-text messages get empty content.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let user = self
            .0
            .from
            .as_ref()
            .map(|u| TelegramUserWrapper(u).to_core())
            .unwrap_or_else(|| User {
                id: 0,
                username: None,
                first_name: None,
            });
        let chat = Chat {
            id: self.0.chat.id.0,
            chat_type: format!("{:?}", self.0.chat.kind),
        };
        Message::new(
            self.0.id.to_string(),
            user,
            chat,
            self.0.text().unwrap_or(""),
        )
    }
}
