//! # handwitch-telegram
//!
//! Telegram layer: teloxide ↔ core adapters, the [`handwitch_core::Bot`] implementation, config
//! loading and the REPL runner that feeds every update into the session router.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{reply_keyboard, TelegramBotAdapter};
pub use config::{descriptions_path_from_env, BotConfig, FileConfig};
pub use runner::{build_bot, check_descriptions, run_bot, run_repl};
