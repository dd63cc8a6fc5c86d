//! Bot initialization: command list and the `Bot` instance

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::{Config, TELEGRAM_REQUEST_TIMEOUT};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot(config: &Config, token: &SecretString) -> anyhow::Result<Bot> {
    // Uploads of large videos run well past reqwest's default timeout
    let client = ClientBuilder::new().timeout(TELEGRAM_REQUEST_TIMEOUT).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let bot = match &config.bot_api_url {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "grabbot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help", "grabbot").unwrap(), Command::Help);
        assert!(Command::parse("/unknown", "grabbot").is_err());
    }

    #[test]
    fn test_command_list() {
        let names: Vec<String> = Command::bot_commands()
            .into_iter()
            .map(|c| c.command.trim_start_matches('/').to_string())
            .collect();
        assert_eq!(names, vec!["start", "help"]);
    }

    #[test]
    fn test_create_bot_rejects_bad_api_url() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.bot_api_url = Some("not a url".into());
        let token = SecretString::from("123:abc");
        assert!(create_bot(&config, &token).is_err());
    }
}
