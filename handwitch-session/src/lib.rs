//! # handwitch-session
//!
//! The interactive session engine. [`SessionRouter`] maps each incoming message to one conversation
//! keyed by (chat, user); each conversation runs as its own task. A `/process` conversation is driven
//! by [`ParamsMachine`], which collects the hand's missing parameters through reply-keyboard buttons
//! and free text (interpreted by [`button_router`]) and finally executes the hand.

pub mod auth;
pub mod button_router;
pub mod buttons;
pub mod command;
pub mod config;
pub mod conversation;
pub mod error;
pub mod help;
pub mod machine;
pub mod registry;
pub mod router;

pub use auth::{AllowAll, Authorisation, Role, WhiteList};
pub use button_router::{route, Action, RouteContext};
pub use buttons::{ExtraButton, CANCEL_MARKER, HAND_HELP_MARKER, OK_MARKER, PARAM_HELP_MARKER};
pub use command::{Command, CommandKind};
pub use config::SessionConfig;
pub use conversation::{ChatConversation, Conversation, ParamsRequest};
pub use error::{Result, SessionError};
pub use help::run_command;
pub use machine::{missing_params, Missing, ParamsMachine, State};
pub use registry::{SessionKey, SessionRegistry, SessionSlot};
pub use router::{Dispatch, SessionRouter};
