//! Bot config: Telegram connection, logging, hand descriptions, access and session tuning.
//! Loaded from env, optionally overlaid by a JSON config file.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use handwitch_session::SessionConfig;
use serde::Deserialize;
use teloxide::types::ParseMode;

pub const DEFAULT_LOG_FILE: &str = "logs/handwitch.log";
pub const DEFAULT_DESCRIPTIONS_PATH: &str = "descriptions.yaml";
pub const DEFAULT_FORMATTING: &str = "markdown";

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
    /// Hand descriptions file (.json, .yaml or .yml)
    pub descriptions_path: String,
    /// JSON array of allowed logins; everybody is allowed when unset
    pub white_list: Option<String>,
    /// Parse mode of outgoing messages: markdown, markdownv2, html, or empty for plain text
    pub formatting: String,
    /// Proxy for Telegram API requests
    pub proxy: Option<String>,
    pub session_queue_capacity: usize,
    /// 0 disables the idle timeout
    pub session_idle_timeout_secs: u64,
}

/// Keys accepted in the JSON config file. Every key is optional and wins over the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub path: Option<String>,
    pub white_list: Option<String>,
    pub formatting: Option<String>,
    pub proxy: Option<String>,
    pub log_file: Option<String>,
    pub session_queue_capacity: Option<usize>,
    pub session_idle_timeout_secs: Option<u64>,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Numeric env var; unset or empty gives `default`, anything unparseable is an error.
fn parsed_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {}", key, raw)),
        None => Ok(default),
    }
}

/// DESCRIPTIONS_PATH or the default.
pub fn descriptions_path_from_env() -> String {
    non_empty_var("DESCRIPTIONS_PATH").unwrap_or_else(|| DEFAULT_DESCRIPTIONS_PATH.to_string())
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => non_empty_var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let telegram_api_url = non_empty_var("TELEGRAM_API_URL").or_else(|| non_empty_var("TELOXIDE_API_URL"));
        let log_file = non_empty_var("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        let formatting = env::var("FORMATTING").unwrap_or_else(|_| DEFAULT_FORMATTING.to_string());
        let session_queue_capacity = parsed_var("SESSION_QUEUE_CAPACITY", 8)?;
        let session_idle_timeout_secs = parsed_var("SESSION_IDLE_TIMEOUT_SECS", 600)?;

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            descriptions_path: descriptions_path_from_env(),
            white_list: non_empty_var("WHITE_LIST"),
            formatting,
            proxy: non_empty_var("PROXY"),
            session_queue_capacity,
            session_idle_timeout_secs,
        })
    }

    /// Overlays the keys present in `file`.
    pub fn apply(&mut self, file: FileConfig) {
        if let Some(path) = file.path {
            self.descriptions_path = path;
        }
        if let Some(white_list) = file.white_list {
            self.white_list = Some(white_list).filter(|w| !w.is_empty());
        }
        if let Some(formatting) = file.formatting {
            self.formatting = formatting;
        }
        if let Some(proxy) = file.proxy {
            self.proxy = Some(proxy).filter(|p| !p.is_empty());
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file;
        }
        if let Some(capacity) = file.session_queue_capacity {
            self.session_queue_capacity = capacity;
        }
        if let Some(secs) = file.session_idle_timeout_secs {
            self.session_idle_timeout_secs = secs;
        }
    }

    /// Reads a JSON config file and overlays it.
    pub fn apply_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let file: FileConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        self.apply(file);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref proxy) = self.proxy {
            reqwest::Proxy::all(proxy.as_str())
                .with_context(|| format!("PROXY is not a valid proxy URL: {}", proxy))?;
        }
        self.parse_mode()?;
        if self.session_queue_capacity == 0 {
            anyhow::bail!("SESSION_QUEUE_CAPACITY must be at least 1");
        }
        Ok(())
    }

    /// Parse mode for outgoing messages; `None` sends plain text.
    #[allow(deprecated)]
    pub fn parse_mode(&self) -> Result<Option<ParseMode>> {
        match self.formatting.to_lowercase().as_str() {
            "" => Ok(None),
            "markdown" => Ok(Some(ParseMode::Markdown)),
            "markdownv2" => Ok(Some(ParseMode::MarkdownV2)),
            "html" => Ok(Some(ParseMode::Html)),
            other => anyhow::bail!("unknown formatting: {}", other),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            queue_capacity: self.session_queue_capacity,
            idle_timeout: (self.session_idle_timeout_secs > 0)
                .then(|| Duration::from_secs(self.session_idle_timeout_secs)),
        }
    }
}
