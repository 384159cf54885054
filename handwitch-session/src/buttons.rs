//! Button text protocol. Pressing a reply-keyboard button sends its label as plain text, so these
//! literals are the wire format between the keyboard and the state machine.

use handwitch_core::Keyboard;

/// Prefix of a per-parameter help button: `"🤖 help <param>"`.
pub const PARAM_HELP_MARKER: &str = "🤖 help";
pub const HAND_HELP_MARKER: &str = "🤖 hand help";
pub const OK_MARKER: &str = "🤖 Start!";
pub const CANCEL_MARKER: &str = "🤖 cancel";

/// Control buttons appended below the parameter rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraButton {
    Cancel,
    Ok,
    Help,
}

/// Marker → control button. Matched by exact equality.
pub const CONTROL_MARKERS: [(&str, ExtraButton); 3] = [
    (CANCEL_MARKER, ExtraButton::Cancel),
    (OK_MARKER, ExtraButton::Ok),
    (HAND_HELP_MARKER, ExtraButton::Help),
];

impl ExtraButton {
    pub fn marker(self) -> &'static str {
        match self {
            ExtraButton::Cancel => CANCEL_MARKER,
            ExtraButton::Ok => OK_MARKER,
            ExtraButton::Help => HAND_HELP_MARKER,
        }
    }
}

pub fn control_button(text: &str) -> Option<ExtraButton> {
    CONTROL_MARKERS
        .iter()
        .find(|(marker, _)| *marker == text)
        .map(|(_, button)| *button)
}

pub fn param_help_label(param: &str) -> String {
    format!("{} {}", PARAM_HELP_MARKER, param)
}

/// Parameter name from a help button label, or `None` if `text` is not one.
pub fn parse_param_help(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(PARAM_HELP_MARKER)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// One `[param, help param]` row per missing parameter, then one row with the requested controls.
pub fn params_keyboard<'a>(
    missing: impl IntoIterator<Item = &'a str>,
    controls: &[ExtraButton],
) -> Keyboard {
    let keyboard = missing.into_iter().fold(Keyboard::new(), |kb, name| {
        kb.row([name.to_string(), param_help_label(name)])
    });
    keyboard.row(controls.iter().map(|b| b.marker()))
}
