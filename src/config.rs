//! Run configuration, built once at startup and shared by reference.

use std::fmt;

use crate::retailer::Credentials;

/// Messaging bot account and the chat notifications go to.
#[derive(Clone)]
pub struct BotConfig {
    token: String,
    chat_id: String,
}

impl BotConfig {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"********")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    credentials: Credentials,
    bot: BotConfig,
    retailer_url: Option<String>,
    bot_api_url: Option<String>,
}

impl Config {
    pub fn new(credentials: Credentials, bot: BotConfig) -> Self {
        Self {
            credentials,
            bot,
            retailer_url: None,
            bot_api_url: None,
        }
    }

    /// Points the retailer client somewhere other than the public shop.
    pub fn with_retailer_url(mut self, url: impl Into<String>) -> Self {
        self.retailer_url = Some(url.into());
        self
    }

    /// Points the notifier somewhere other than the public bot API.
    pub fn with_bot_api_url(mut self, url: impl Into<String>) -> Self {
        self.bot_api_url = Some(url.into());
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    pub fn retailer_url(&self) -> Option<&str> {
        self.retailer_url.as_deref()
    }

    pub fn bot_api_url(&self) -> Option<&str> {
        self.bot_api_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_public_endpoints() {
        let config = Config::new(
            Credentials::new("me@example.com", "pw"),
            BotConfig::new("123:abc", "42"),
        );
        assert_eq!(config.retailer_url(), None);
        assert_eq!(config.bot_api_url(), None);
        assert_eq!(config.credentials().email(), "me@example.com");
        assert_eq!(config.bot().chat_id(), "42");
    }

    #[test]
    fn test_config_debug_hides_secrets() {
        let config = Config::new(
            Credentials::new("me@example.com", "s3cret"),
            BotConfig::new("123:abc", "42"),
        )
        .with_bot_api_url("http://localhost:1");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("123:abc"));
        assert!(debug.contains("localhost:1"));
    }
}
