//! Command execution for a freshly created session.

use std::sync::Arc;

use handwitch_hands::HandSource;
use tokio_util::sync::CancellationToken;

use crate::command::{Command, CommandKind};
use crate::conversation::Conversation;
use crate::error::{Result, SessionError};
use crate::machine::ParamsMachine;

/// Usage text followed by the brief help of every hand.
pub fn common_help(hands: &dyn HandSource) -> String {
    format!(
        "HandWitch helps you to make requests from telegram\n\
         Available commands:\n\
         \t/process {{requestname}} - run requestname, asking for missing params\n\
         \t/help {{requestname}} - help for requestname\n\
         \t/help - this help\n\n{}",
        hands.brief_help()
    )
}

/// Runs the command that opened a session to completion.
pub async fn run_command<C: Conversation>(
    command: Command,
    hands: Arc<dyn HandSource>,
    mut conversation: C,
    cancel: CancellationToken,
) -> Result<()> {
    match &command.kind {
        CommandKind::Process => {
            let name = command.hand_name().ok_or(SessionError::EmptyArguments)?;
            let hand = hands.hand(name)?;
            let mut machine = ParamsMachine::new(hand, conversation, cancel);
            machine.run(&command.arguments).await?;
            Ok(())
        }
        CommandKind::Help | CommandKind::Start => {
            conversation.close();
            let text = match command.hand_name() {
                Some(name) => hands.hand(name)?.help(),
                None => common_help(hands.as_ref()),
            };
            conversation.send(&text).await
        }
        CommandKind::Other(verb) => Err(SessionError::UnknownCommand(verb.clone())),
    }
}
