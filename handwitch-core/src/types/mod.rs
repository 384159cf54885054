//! Core types: user, chat, message, reply keyboard, and transport conversion traits.
//!
//! One file per main type.

mod chat;
mod keyboard;
mod message;
mod user;

pub use chat::Chat;
pub use keyboard::Keyboard;
pub use message::{Message, ToCoreMessage};
pub use user::{ToCoreUser, User};
