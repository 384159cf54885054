//! REPL runner: converts teloxide messages to core messages and dispatches them to the
//! [`SessionRouter`]. Also wires config, descriptions and access control into a running bot.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use handwitch_core::{init_tracing, Bot as CoreBot, ToCoreMessage};
use handwitch_hands::{DescriptionsSource, HandRegistry, HandSource};
use handwitch_session::{AllowAll, Authorisation, Dispatch, SessionRouter, WhiteList};
use teloxide::prelude::*;
use tracing::{debug, info, instrument};

use crate::adapters::TelegramMessageWrapper;
use crate::bot_adapter::TelegramBotAdapter;
use crate::config::BotConfig;

/// teloxide Bot with the configured proxy and API URL.
pub fn build_bot(config: &BotConfig) -> Result<teloxide::Bot> {
    let mut builder = teloxide::net::default_reqwest_settings();
    if let Some(ref proxy) = config.proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str())
            .with_context(|| format!("invalid proxy: {}", proxy))?;
        builder = builder.proxy(proxy);
    }
    let client = builder
        .build()
        .context("failed to build Telegram HTTP client")?;
    let bot = teloxide::Bot::with_client(config.bot_token.clone(), client);
    match config.telegram_api_url {
        Some(ref url_str) => {
            let url = reqwest::Url::parse(url_str)
                .with_context(|| format!("invalid TELEGRAM_API_URL: {}", url_str))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Loads and validates a descriptions file; returns the brief help of every hand.
pub fn check_descriptions(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let source = DescriptionsSource::from_path(path)
        .with_context(|| format!("failed to load descriptions from {}", path.display()))?;
    let mut out = format!("{} hands in {}\n\n", source.len(), path.display());
    for hand in source.iter() {
        out.push_str(&hand.brief());
    }
    Ok(out)
}

/// Main entry: init logging, validate config, load hands and access list, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(Some(config.log_file.as_str()))?;

    let source = DescriptionsSource::from_path(&config.descriptions_path).with_context(|| {
        format!("failed to load descriptions from {}", config.descriptions_path)
    })?;
    info!(
        path = %config.descriptions_path,
        hands = source.len(),
        "Hand descriptions loaded"
    );
    let hands = Arc::new(HandRegistry::new(source, reqwest::Client::new()));
    info!(hands = ?hands.hand_names(), "Hands available");

    let auth: Arc<dyn Authorisation> = match config.white_list {
        Some(ref path) => {
            let list = WhiteList::from_path(path)
                .with_context(|| format!("failed to load white list from {}", path))?;
            info!(path = %path, users = list.len(), "White list loaded");
            Arc::new(list)
        }
        None => {
            info!("No white list configured, every user is allowed");
            Arc::new(AllowAll)
        }
    };

    let teloxide_bot = build_bot(&config)?;
    let adapter: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(
        teloxide_bot.clone(),
        config.parse_mode()?,
    ));
    let router = Arc::new(SessionRouter::new(
        hands,
        adapter,
        auth,
        config.session_config(),
    ));

    let token = router.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, cancelling sessions");
            token.cancel();
        }
    });

    info!("Bot started successfully");
    run_repl(teloxide_bot, router).await
}

/// Starts the REPL. Updates of one chat arrive here one at a time, so dispatching inline keeps
/// every (chat, user) conversation in arrival order.
#[instrument(skip(bot, router))]
pub async fn run_repl(bot: teloxide::Bot, router: Arc<SessionRouter>) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Bot username resolved before repl");
        }
    }

    let repl_router = router.clone();
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let router = repl_router.clone();

        async move {
            let Some(text) = msg.text() else {
                debug!(chat_id = msg.chat.id.0, "Received non-text message, skipped");
                return Ok(());
            };
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_content = %text,
                "Received message"
            );

            let outcome = router.dispatch(core_msg).await;
            if outcome == Dispatch::Cancelled {
                debug!(chat_id = msg.chat.id.0, "Shutting down, message dropped");
            }
            Ok(())
        }
    })
    .await;

    router.shutdown();
    Ok(())
}
