//! # handwitch-core
//!
//! Core types and traits shared by the handwitch crates: [`Bot`], [`Message`], [`Keyboard`],
//! user and chat identities, the top-level error, and tracing initialization. Transport-agnostic;
//! handwitch-telegram provides the teloxide-backed [`Bot`].

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{HandwitchError, Result};
pub use logger::init_tracing;
pub use types::{Chat, Keyboard, Message, ToCoreMessage, ToCoreUser, User};
