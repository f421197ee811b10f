use anyhow::Result;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use log::info;
use slotwatch::config::{BotConfig, Config};
use slotwatch::notify::TelegramNotifier;
use slotwatch::retailer::{BarboraClient, Credentials};

/// slotwatch - Barbora delivery slot watcher
///
/// Logs in to Barbora, checks the delivery schedule once and sends a Telegram
/// message for every available delivery slot.
///
/// Examples:
///   slotwatch -e me@example.com -p secret --botapikey 123:abc --botchatid 42
#[derive(Parser, Debug)]
#[command(author, version = env!("SLOTWATCH_VERSION"), about)]
struct Cli {
    /// Email to log in with
    #[arg(long, short = 'e', value_parser = NonEmptyStringValueParser::new())]
    email: String,

    /// Password to log in with
    #[arg(long, short = 'p', value_parser = NonEmptyStringValueParser::new())]
    password: String,

    /// Telegram bot API key
    #[arg(long = "botapikey", value_name = "TOKEN", value_parser = NonEmptyStringValueParser::new())]
    bot_api_key: String,

    /// Telegram chat id to notify
    #[arg(long = "botchatid", value_name = "CHAT_ID", value_parser = NonEmptyStringValueParser::new())]
    bot_chat_id: String,

    /// Retailer API URL (defaults to https://barbora.lt)
    #[arg(long = "retailer-url", value_name = "URL", hide = true)]
    retailer_url: Option<String>,

    /// Bot API URL (defaults to https://api.telegram.org)
    #[arg(long = "bot-api-url", value_name = "URL", hide = true)]
    bot_api_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(
            Credentials::new(self.email, self.password),
            BotConfig::new(self.bot_api_key, self.bot_chat_id),
        );
        if let Some(url) = self.retailer_url {
            config = config.with_retailer_url(url);
        }
        if let Some(url) = self.bot_api_url {
            config = config.with_bot_api_url(url);
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Cli::parse().into_config();

    let retailer = BarboraClient::new(&config)?;
    let notifier = TelegramNotifier::new(&config)?;

    let report = slotwatch::app::run(&retailer, &notifier).await?;
    info!("Done: {:?}", report);
    Ok(())
}
