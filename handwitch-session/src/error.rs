use std::time::Duration;

use handwitch_core::HandwitchError;
use handwitch_hands::HandError;
use thiserror::Error;

/// Errors that end a session. Per-line parse failures and unknown input never surface here; the
/// state machine reports them to the user and keeps going.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] HandwitchError),

    #[error(transparent)]
    Hand(#[from] HandError),

    #[error("Empty arguments")]
    EmptyArguments,

    #[error("Wrong command {0}")]
    UnknownCommand(String),

    #[error("No input for {0:?}")]
    IdleTimeout(Duration),

    #[error("Session cancelled")]
    Cancelled,

    #[error("Session inbox closed")]
    InboxClosed,
}

impl SessionError {
    /// Errors the user caused or can act on; the router reports these back to the chat.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SessionError::Hand(_) | SessionError::EmptyArguments | SessionError::UnknownCommand(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
