//! Command surface: `/verb[@bot] <argument block>`. The first line of the argument block names the
//! hand, the remaining lines are `name value` pairs.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Process,
    Help,
    Start,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub arguments: String,
}

impl Command {
    /// Returns `None` when `text` is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix('/')?;
        let (head, rest) = match body.find(char::is_whitespace) {
            Some(i) => body.split_at(i),
            None => (body, ""),
        };
        let verb = head.split('@').next().unwrap_or_default();
        if verb.is_empty() {
            return None;
        }
        let kind = match verb {
            "process" => CommandKind::Process,
            "help" => CommandKind::Help,
            "start" => CommandKind::Start,
            other => CommandKind::Other(other.to_string()),
        };
        Some(Self {
            kind,
            arguments: rest.trim_start().to_string(),
        })
    }

    /// First line of the argument block, trimmed; `None` when the block is empty.
    pub fn hand_name(&self) -> Option<&str> {
        let name = self.arguments.lines().next()?.trim();
        (!name.is_empty()).then_some(name)
    }
}
