//! Bot abstraction for sending messages and reply keyboards.
//!
//! [`Bot`] is transport-agnostic; handwitch-telegram implements it via teloxide and tests substitute
//! recording implementations.

use crate::error::Result;
use crate::types::{Chat, Keyboard};
use async_trait::async_trait;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat and clears any reply keyboard shown there.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a text message together with a reply keyboard whose buttons echo their label back as text.
    async fn send_keyboard(&self, chat: &Chat, text: &str, keyboard: &Keyboard) -> Result<()>;
}
