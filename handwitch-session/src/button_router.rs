//! Interprets one reply while the machine is waiting in `InquireParams`.
//!
//! Matchers are tried in table order and the first hit wins; no match means the text is unknown.
//! Routing is pure: the returned [`Action`] is carried out by the state machine.

use handwitch_hands::{HandProcessor, ParamInfo};
use tracing::debug;

use crate::buttons::{control_button, parse_param_help, ExtraButton};
use crate::machine::Missing;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show help for one of the hand's parameters.
    ParamHelp(ParamInfo),
    /// Ask for the value of a missing parameter.
    SelectParam(ParamInfo),
    HandHelp,
    Confirm,
    /// Ok pressed while params are still missing; reported, then handled as unknown text.
    NotReady,
    Cancel,
    /// The text holds `name value` rows to assign.
    BulkAssign,
}

pub struct RouteContext<'a> {
    pub hand: &'a dyn HandProcessor,
    pub missing: &'a Missing,
}

type Matcher = fn(&str, &RouteContext<'_>) -> Option<Action>;

const MATCHERS: [(&str, Matcher); 6] = [
    ("param_help", param_help),
    ("select_param", select_param),
    ("hand_help", hand_help),
    ("confirm", confirm),
    ("cancel", cancel),
    ("bulk_assign", bulk_assign),
];

pub fn route(text: &str, ctx: &RouteContext<'_>) -> Option<Action> {
    MATCHERS.iter().find_map(|(name, matcher)| {
        let action = matcher(text, ctx)?;
        debug!(matcher = name, hand = ctx.hand.name(), "Reply matched");
        Some(action)
    })
}

fn param_help(text: &str, ctx: &RouteContext<'_>) -> Option<Action> {
    let name = parse_param_help(text)?;
    ctx.hand.param(name).ok().cloned().map(Action::ParamHelp)
}

fn select_param(text: &str, ctx: &RouteContext<'_>) -> Option<Action> {
    ctx.missing.get(text).cloned().map(Action::SelectParam)
}

fn hand_help(text: &str, _ctx: &RouteContext<'_>) -> Option<Action> {
    (control_button(text) == Some(ExtraButton::Help)).then_some(Action::HandHelp)
}

/// Only honoured once nothing is missing.
fn confirm(text: &str, ctx: &RouteContext<'_>) -> Option<Action> {
    if control_button(text) != Some(ExtraButton::Ok) {
        return None;
    }
    if ctx.missing.is_empty() {
        Some(Action::Confirm)
    } else {
        Some(Action::NotReady)
    }
}

fn cancel(text: &str, _ctx: &RouteContext<'_>) -> Option<Action> {
    (control_button(text) == Some(ExtraButton::Cancel)).then_some(Action::Cancel)
}

/// Any line shaped like `<known param> <value>` turns the whole text into a bulk assignment.
fn bulk_assign(text: &str, ctx: &RouteContext<'_>) -> Option<Action> {
    let params = ctx.hand.params();
    text.lines()
        .any(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            fields.len() == 2 && params.contains_key(fields[0])
        })
        .then_some(Action::BulkAssign)
}
