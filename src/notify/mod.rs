//! Slot notifications through a Telegram bot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method};

use crate::config::Config;
use crate::http::{CONNECT_TIMEOUT, HttpSession, RequestOptions};
use crate::retry::RetryPolicy;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Sends messages with the bot API's `sendMessage` method.
///
/// Fire and forget: once the request got through, the reply is ignored.
pub struct TelegramNotifier {
    session: HttpSession,
    chat_id: String,
}

impl TelegramNotifier {
    #[tracing::instrument(skip(config))]
    pub fn new(config: &Config) -> Result<Self> {
        let api_url = config.bot_api_url().unwrap_or(TELEGRAM_API_URL);

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build bot HTTP client")?;

        // The token is part of the path; keeping it in the base URL keeps it
        // out of the per-request logs.
        let base_url = format!(
            "{}/bot{}",
            api_url.trim_end_matches('/'),
            config.bot().token()
        );

        Ok(Self {
            session: HttpSession::new(client, base_url),
            chat_id: config.bot().chat_id().to_string(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.session = self.session.with_retry_policy(policy);
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[tracing::instrument(skip(self))]
    async fn send(&self, message: &str) -> Result<()> {
        let options = RequestOptions::default()
            .query("chat_id", &self.chat_id)
            .query("parse_mode", "Markdown")
            .query("text", message);

        let response = self
            .session
            .send(Method::GET, "sendMessage", &options)
            .await
            .context("Failed to send notification")?;

        debug!("sendMessage -> {}", response.status());
        info!("Notified chat {}: {}", self.chat_id, message);
        Ok(())
    }
}
