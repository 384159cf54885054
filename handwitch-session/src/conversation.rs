//! The session's view of its chat: send text, wait for the next reply, show the parameter prompt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use handwitch_core::{Bot, Chat};
use handwitch_hands::Params;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buttons::{params_keyboard, ExtraButton};
use crate::error::{Result, SessionError};
use crate::machine::Missing;

/// What the user is asked for while parameters are being collected.
#[derive(Debug, Clone, Copy)]
pub struct ParamsRequest<'a> {
    pub missing: &'a Missing,
    pub values: &'a Params,
    pub controls: &'a [ExtraButton],
}

impl ParamsRequest<'_> {
    /// `Current values:` block (when anything is set) followed by the `Missed params:` line.
    pub fn prompt(&self) -> String {
        let mut out = String::new();
        if !self.values.is_empty() {
            out.push_str("Current values:\n");
            for (name, value) in self.values {
                out.push_str(&format!("{} {}\n", name, value));
            }
        }
        if !self.missing.is_empty() {
            let names: Vec<String> = self.missing.keys().map(|n| format!("\"{}\"", n)).collect();
            out.push_str(&format!("Missed params: {}\n", names.join(", ")));
        }
        if out.is_empty() {
            out.push_str("All params specified\n");
        }
        out
    }
}

#[async_trait]
pub trait Conversation: Send {
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Next message addressed to this session.
    async fn get(&mut self) -> Result<String>;

    async fn request_params(&mut self, request: ParamsRequest<'_>) -> Result<()>;

    /// Stops accepting input; the router then treats the session as gone.
    fn close(&mut self) {}
}

/// Conversation backed by a [`Bot`] and the session's inbox.
pub struct ChatConversation {
    bot: Arc<dyn Bot>,
    chat: Chat,
    inbox: mpsc::Receiver<String>,
    cancel: CancellationToken,
    idle_timeout: Option<Duration>,
}

impl ChatConversation {
    pub fn new(
        bot: Arc<dyn Bot>,
        chat: Chat,
        inbox: mpsc::Receiver<String>,
        cancel: CancellationToken,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            bot,
            chat,
            inbox,
            cancel,
            idle_timeout,
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }
}

#[async_trait]
impl Conversation for ChatConversation {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.ensure_live()?;
        self.bot.send_message(&self.chat, text).await?;
        Ok(())
    }

    async fn get(&mut self) -> Result<String> {
        let next = match self.idle_timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
                received = tokio::time::timeout(limit, self.inbox.recv()) => match received {
                    Ok(received) => received,
                    Err(_) => {
                        // refuse further deliveries so the router starts over instead
                        self.inbox.close();
                        return Err(SessionError::IdleTimeout(limit));
                    }
                },
            },
            None => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
                received = self.inbox.recv() => received,
            },
        };
        let text = next.ok_or(SessionError::InboxClosed)?;
        debug!(chat_id = self.chat.id, text = %text, "Session received message");
        Ok(text)
    }

    async fn request_params(&mut self, request: ParamsRequest<'_>) -> Result<()> {
        self.ensure_live()?;
        let keyboard = params_keyboard(
            request.missing.keys().map(String::as_str),
            request.controls,
        );
        self.bot
            .send_keyboard(&self.chat, &request.prompt(), &keyboard)
            .await?;
        Ok(())
    }

    fn close(&mut self) {
        self.inbox.close();
    }
}
