//! Shared fixtures: a recording bot, a fake hand catalogue and a scripted conversation.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use handwitch_core::{Bot, Chat, Keyboard, Message, User};
use handwitch_hands::{
    HandDescriptor, HandError, HandProcessor, HandSource, ParamDestination, ParamInfo, ParamType,
    Params,
};
use handwitch_session::{Conversation, ExtraButton, ParamsRequest, SessionError};
use tokio::sync::mpsc;

/// One outgoing message as seen by the chat.
#[derive(Debug, Clone)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// Mock Bot that records every send.
pub struct MockBot {
    sender: mpsc::UnboundedSender<Sent>,
}

impl MockBot {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Sent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { sender: tx }), rx)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> handwitch_core::Result<()> {
        let _ = self.sender.send(Sent {
            chat_id: chat.id,
            text: text.to_string(),
            keyboard: None,
        });
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat: &Chat,
        text: &str,
        keyboard: &Keyboard,
    ) -> handwitch_core::Result<()> {
        let _ = self.sender.send(Sent {
            chat_id: chat.id,
            text: text.to_string(),
            keyboard: Some(keyboard.clone()),
        });
        Ok(())
    }
}

/// Routes engine logs to the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Waits for the next outgoing message; fails the test after two seconds.
pub async fn next_sent(rx: &mut mpsc::UnboundedReceiver<Sent>) -> Sent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for bot output")
        .expect("bot channel closed")
}

/// Asserts nothing more is sent within a short grace period.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Sent>) {
    let extra = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(extra.is_err(), "unexpected bot output: {:?}", extra);
}

pub fn message(chat_id: i64, username: &str, text: &str) -> Message {
    Message::new(
        format!("msg_{}", chat_id),
        User {
            id: chat_id * 100,
            username: Some(username.to_string()),
            first_name: None,
        },
        Chat {
            id: chat_id,
            chat_type: "private".to_string(),
        },
        text,
    )
}

pub fn param(
    name: &str,
    destination: ParamDestination,
    param_type: ParamType,
    optional: bool,
) -> ParamInfo {
    ParamInfo {
        name: name.to_string(),
        help: format!("{} help", name),
        destination,
        param_type,
        optional,
        default_value: None,
    }
}

/// Hand that renders its params instead of calling out over HTTP.
pub struct FakeHand {
    descriptor: HandDescriptor,
    calls: AtomicUsize,
    delay: Duration,
    failure: Option<String>,
}

impl FakeHand {
    pub fn new(name: &str, params: Vec<ParamInfo>) -> Self {
        Self {
            descriptor: HandDescriptor {
                name: name.to_string(),
                url_template: format!("http://localhost/{}", name),
                body: String::new(),
                parameters: params.into_iter().map(|p| (p.name.clone(), p)).collect(),
                help: format!("{} hand", name),
            },
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            failure: None,
        }
    }

    /// `greet`: required `name` (string, URL) and `age` (integer, query); optional `city`.
    pub fn greet() -> Self {
        Self::new(
            "greet",
            vec![
                param("name", ParamDestination::UrlPlaced, ParamType::String, false),
                param("age", ParamDestination::QueryPlaced, ParamType::Integer, false),
                param("city", ParamDestination::QueryPlaced, ParamType::String, true),
            ],
        )
    }

    /// `ping`: a single optional parameter, so nothing is ever missing.
    pub fn ping() -> Self {
        Self::new(
            "ping",
            vec![param("verbose", ParamDestination::QueryPlaced, ParamType::String, true)],
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every run fail as if the upstream answered with something that is not JSON.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandProcessor for FakeHand {
    fn descriptor(&self) -> &HandDescriptor {
        &self.descriptor
    }

    async fn process(&self, params: &Params) -> handwitch_hands::Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(HandError::Decode(reason.clone()));
        }
        let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        Ok(format!("{}: {}", self.descriptor.name, rendered.join(" ")))
    }
}

pub struct FakeHands {
    hands: BTreeMap<String, Arc<FakeHand>>,
}

impl FakeHands {
    pub fn new(hands: Vec<Arc<FakeHand>>) -> Arc<Self> {
        Arc::new(Self {
            hands: hands
                .into_iter()
                .map(|h| (h.name().to_string(), h))
                .collect(),
        })
    }
}

impl HandSource for FakeHands {
    fn hand(&self, name: &str) -> handwitch_hands::Result<Arc<dyn HandProcessor>> {
        self.hands
            .get(name)
            .map(|h| h.clone() as Arc<dyn HandProcessor>)
            .ok_or_else(|| HandError::UnknownHand(name.to_string()))
    }

    fn hand_names(&self) -> Vec<String> {
        self.hands.keys().cloned().collect()
    }

    fn brief_help(&self) -> String {
        let mut out = String::from("Available requests:\n\n");
        for hand in self.hands.values() {
            out.push_str(&hand.descriptor().brief());
        }
        out
    }
}

/// One parameter prompt as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub missing: Vec<String>,
    pub values: Params,
    pub controls: Vec<ExtraButton>,
}

/// Conversation fed from a fixed list of replies.
#[derive(Default)]
pub struct ScriptedConversation {
    pub replies: VecDeque<String>,
    pub sent: Vec<String>,
    pub prompts: Vec<Prompt>,
    pub closed: bool,
}

impl ScriptedConversation {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Conversation for ScriptedConversation {
    async fn send(&mut self, text: &str) -> handwitch_session::Result<()> {
        self.sent.push(text.to_string());
        Ok(())
    }

    async fn get(&mut self) -> handwitch_session::Result<String> {
        if self.closed {
            return Err(SessionError::InboxClosed);
        }
        self.replies.pop_front().ok_or(SessionError::InboxClosed)
    }

    async fn request_params(&mut self, request: ParamsRequest<'_>) -> handwitch_session::Result<()> {
        self.prompts.push(Prompt {
            missing: request.missing.keys().cloned().collect(),
            values: request.values.clone(),
            controls: request.controls.to_vec(),
        });
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
