//! Parameter-collection state machine driving one `/process` conversation.
//!
//! ```text
//! Start ──► InquireParams ──► Finish
//!              │   ▲  │
//!              ▼   │  └────► Cancel
//!           QueryParam
//! ```
//!
//! `InquireParams` moves straight to `Finish` once no required parameter is missing.

use std::collections::BTreeMap;
use std::sync::Arc;

use handwitch_hands::{HandProcessor, ParamInfo, Params};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::button_router::{route, Action, RouteContext};
use crate::buttons::ExtraButton;
use crate::conversation::{Conversation, ParamsRequest};
use crate::error::{Result, SessionError};

const MSG_NOT_ALL_PARAMS: &str = "Not all params specified!";

/// Required parameters without a value, keyed by name.
pub type Missing = BTreeMap<String, ParamInfo>;

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Start { arguments: String },
    InquireParams { params: Params },
    QueryParam {
        param: ParamInfo,
        params: Params,
        missing: Missing,
    },
    Finish { params: Params },
    Cancel,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Start { .. } => "start",
            State::InquireParams { .. } => "inquire_params",
            State::QueryParam { .. } => "query_param",
            State::Finish { .. } => "finish",
            State::Cancel => "cancel",
        }
    }
}

/// Required parameters of `hand` that `params` does not cover.
pub fn missing_params(hand: &dyn HandProcessor, params: &Params) -> Missing {
    hand.required_params()
        .into_iter()
        .filter(|p| !params.contains_key(&p.name))
        .map(|p| (p.name.clone(), p.clone()))
        .collect()
}

/// Help and Cancel are always offered; Ok only when nothing is missing.
fn control_buttons(missing: &Missing) -> Vec<ExtraButton> {
    let mut buttons = vec![ExtraButton::Help, ExtraButton::Cancel];
    if missing.is_empty() {
        buttons.push(ExtraButton::Ok);
    }
    buttons
}

pub struct ParamsMachine<C> {
    hand: Arc<dyn HandProcessor>,
    conversation: C,
    cancel: CancellationToken,
}

impl<C: Conversation> ParamsMachine<C> {
    pub fn new(hand: Arc<dyn HandProcessor>, conversation: C, cancel: CancellationToken) -> Self {
        Self {
            hand,
            conversation,
            cancel,
        }
    }

    pub fn conversation(&self) -> &C {
        &self.conversation
    }

    /// Runs from `Start` until a terminal state. `arguments` is the command's argument block; its
    /// first line (the hand name) is skipped.
    pub async fn run(&mut self, arguments: &str) -> Result<()> {
        let mut state = State::Start {
            arguments: arguments.to_string(),
        };
        loop {
            debug!(hand = self.hand.name(), state = state.name(), "step: enter");
            match self.step(state).await? {
                Some(next) => state = next,
                None => return Ok(()),
            }
        }
    }

    /// Executes one state and returns the next, or `None` once the session is over.
    pub async fn step(&mut self, state: State) -> Result<Option<State>> {
        match state {
            State::Start { arguments } => self.start(&arguments).await.map(Some),
            State::InquireParams { params } => self.inquire_params(params).await.map(Some),
            State::QueryParam {
                param,
                params,
                missing,
            } => self.query_param(param, params, missing).await.map(Some),
            State::Finish { params } => self.finish(params).await.map(|_| None),
            State::Cancel => self.abort().await.map(|_| None),
        }
    }

    async fn start(&mut self, arguments: &str) -> Result<State> {
        let mut params = Params::new();
        self.assign_rows(arguments.lines().skip(1), &mut params)
            .await?;
        Ok(State::InquireParams { params })
    }

    async fn inquire_params(&mut self, mut params: Params) -> Result<State> {
        let missing = missing_params(self.hand.as_ref(), &params);
        if missing.is_empty() {
            return Ok(State::Finish { params });
        }
        let controls = control_buttons(&missing);

        loop {
            self.conversation
                .request_params(ParamsRequest {
                    missing: &missing,
                    values: &params,
                    controls: &controls,
                })
                .await?;
            let text = self.conversation.get().await?;
            let ctx = RouteContext {
                hand: self.hand.as_ref(),
                missing: &missing,
            };
            match route(&text, &ctx) {
                Some(Action::ParamHelp(param)) => {
                    self.conversation.send(&param.help_text()).await?;
                }
                Some(Action::SelectParam(param)) => {
                    return Ok(State::QueryParam {
                        param,
                        params,
                        missing,
                    });
                }
                Some(Action::HandHelp) => {
                    let help = self.hand.help();
                    self.conversation.send(&help).await?;
                }
                Some(Action::Confirm) => return Ok(State::Finish { params }),
                Some(Action::NotReady) => {
                    self.conversation.send(MSG_NOT_ALL_PARAMS).await?;
                    self.conversation
                        .send(&format!("I don't know what is: \"{}\"", text))
                        .await?;
                }
                Some(Action::Cancel) => return Ok(State::Cancel),
                Some(Action::BulkAssign) => {
                    self.assign_rows(text.lines(), &mut params).await?;
                    return Ok(State::InquireParams { params });
                }
                None => {
                    self.conversation
                        .send(&format!("I don't know what is: \"{}\"", text))
                        .await?;
                }
            }
        }
    }

    async fn query_param(
        &mut self,
        param: ParamInfo,
        mut params: Params,
        mut missing: Missing,
    ) -> Result<State> {
        self.conversation
            .send(&format!("Input value for param: \"{}\"", param.name))
            .await?;
        loop {
            let text = self.conversation.get().await?;
            match param.parse_value(&text) {
                Ok(value) => {
                    missing.remove(&param.name);
                    params.insert(param.name.clone(), value);
                    debug!(
                        hand = self.hand.name(),
                        param = %param.name,
                        still_missing = missing.len(),
                        "Param assigned"
                    );
                    return Ok(State::InquireParams { params });
                }
                Err(e) => {
                    self.conversation
                        .send(&format!("Failed to parse param: {}", e))
                        .await?;
                }
            }
        }
    }

    async fn finish(&mut self, params: Params) -> Result<()> {
        self.conversation.close();
        let missing = missing_params(self.hand.as_ref(), &params);
        if !missing.is_empty() {
            self.conversation.send(MSG_NOT_ALL_PARAMS).await?;
            return Ok(());
        }
        info!(hand = self.hand.name(), params = params.len(), "step: process hand");
        let output = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
            output = self.hand.process(&params) => output?,
        };
        self.conversation.send(&output).await
    }

    async fn abort(&mut self) -> Result<()> {
        self.conversation.close();
        info!(hand = self.hand.name(), "step: cancelled by user");
        self.conversation.send("Canceled").await
    }

    /// Assigns every non-blank `name value` row; rows that fail to parse are reported and skipped.
    async fn assign_rows<'a>(
        &mut self,
        rows: impl Iterator<Item = &'a str> + Send,
        params: &mut Params,
    ) -> Result<()> {
        for row in rows {
            if row.trim().is_empty() {
                continue;
            }
            match self.hand.parse_row(row) {
                Ok((name, value)) => {
                    params.insert(name, value);
                }
                Err(e) => {
                    self.conversation
                        .send(&format!("Failed to parse param \"{}\": {}", row.trim(), e))
                        .await?;
                }
            }
        }
        Ok(())
    }
}
