//! Session router: maps each incoming message to at most one session.
//!
//! **Data flow:** `dispatch` → authorise → look up (chat, user) → either deliver the text to the live
//! session's inbox, or (for a command) register a new session and spawn its task → the task runs the
//! command, removes its own registry entry and reports any user-facing error.
//!
//! Callers must dispatch messages of one chat in arrival order; the router keeps that order per key.

use std::sync::Arc;

use handwitch_core::{Bot, Chat, Message};
use handwitch_hands::HandSource;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::{Authorisation, Role};
use crate::command::Command;
use crate::config::SessionConfig;
use crate::conversation::ChatConversation;
use crate::error::SessionError;
use crate::help::run_command;
use crate::registry::{SessionKey, SessionRegistry};

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The sender is not allowed to use the bot.
    Denied,
    /// Not a command and no session is waiting for it.
    Ignored,
    /// A new session was created for this command.
    Started,
    /// Handed to the live session.
    Delivered,
    /// Shutdown began before the message could be handed over.
    Cancelled,
}

pub struct SessionRouter {
    registry: Arc<SessionRegistry>,
    hands: Arc<dyn HandSource>,
    bot: Arc<dyn Bot>,
    auth: Arc<dyn Authorisation>,
    config: SessionConfig,
    cancel: CancellationToken,
}

impl SessionRouter {
    pub fn new(
        hands: Arc<dyn HandSource>,
        bot: Arc<dyn Bot>,
        auth: Arc<dyn Authorisation>,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            hands,
            bot,
            auth,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` as the shutdown signal for the router and every session it spawns.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signals every session to stop at its next suspension point.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    pub async fn dispatch(&self, message: Message) -> Dispatch {
        let login = message.user.login();
        if self.auth.role(&login) != Role::User {
            warn!(user = %login, chat_id = message.chat.id, "Unauthorised user, message dropped");
            return Dispatch::Denied;
        }
        if self.cancel.is_cancelled() {
            return Dispatch::Cancelled;
        }
        let key = SessionKey::new(message.chat.id, login);

        loop {
            let mut opened = None;
            let slot = self.registry.get_or_create(&key, || {
                let command = Command::parse(&message.content)?;
                let (tx, rx) = mpsc::channel(self.config.queue_capacity.max(1));
                opened = Some((command, rx));
                Some(tx)
            });
            let Some(slot) = slot else {
                debug!(chat_id = key.chat_id, user = %key.user, "No session and not a command, ignored");
                return Dispatch::Ignored;
            };

            if let (true, Some((command, inbox))) = (slot.created, opened) {
                self.spawn_session(key, slot.id, command, inbox, &message);
                return Dispatch::Started;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Dispatch::Cancelled,
                sent = slot.inbox.send(message.content.clone()) => {
                    if sent.is_ok() {
                        debug!(chat_id = key.chat_id, user = %key.user, session_id = slot.id, "Delivered to session");
                        return Dispatch::Delivered;
                    }
                    // the session stopped reading; drop its entry and treat the text as fresh input
                    debug!(session_id = slot.id, "Session inbox closed, starting over");
                    self.registry.remove(&key, slot.id);
                }
            }
        }
    }

    fn spawn_session(
        &self,
        key: SessionKey,
        id: u64,
        command: Command,
        inbox: mpsc::Receiver<String>,
        message: &Message,
    ) {
        let conversation = ChatConversation::new(
            self.bot.clone(),
            message.chat.clone(),
            inbox,
            self.cancel.clone(),
            self.config.idle_timeout,
        );
        let registry = self.registry.clone();
        let hands = self.hands.clone();
        let bot = self.bot.clone();
        let cancel = self.cancel.clone();
        let chat = message.chat.clone();
        let text = message.content.clone();
        let opener = text.lines().next().unwrap_or_default().trim().to_string();

        info!(
            chat_id = key.chat_id,
            user = %key.user,
            session_id = id,
            command = ?command.kind,
            "Session started"
        );
        tokio::spawn(async move {
            let result = run_command(command, hands, conversation, cancel).await;
            registry.remove(&key, id);
            match result {
                Ok(()) => info!(session_id = id, "Session finished"),
                Err(e) => report_failure(bot.as_ref(), &chat, &text, &opener, id, e).await,
            }
        });
    }
}

/// `opener` is the command line that started the session; an expired user is told to resend it.
async fn report_failure(
    bot: &dyn Bot,
    chat: &Chat,
    text: &str,
    opener: &str,
    id: u64,
    e: SessionError,
) {
    let reply = match &e {
        SessionError::Cancelled => {
            info!(session_id = id, "Session cancelled");
            return;
        }
        SessionError::IdleTimeout(limit) => {
            info!(session_id = id, idle = ?limit, "Session expired");
            format!("Session expired, send \"{}\" to start again", opener)
        }
        e if e.is_user_facing() => {
            warn!(session_id = id, error = %e, "Session failed");
            format!("Error on processing message \"{}\": {}", text, e)
        }
        e => {
            error!(session_id = id, error = %e, "Session failed");
            return;
        }
    };
    if let Err(send_err) = bot.send_message(chat, &reply).await {
        error!(session_id = id, error = %send_err, "Failed to report session error");
    }
}
