use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Review chat the bot posts submissions into.
    pub chat_id: i64,
    /// Challenge token the captcha answer must contain (case-insensitive).
    pub owner_name: String,
    pub port: u16,
    /// Clone URL of the repository approved entries are committed to.
    pub repo_clone_url: String,
    /// Bot API host override, used by tests; None means api.telegram.org.
    pub telegram_api_base: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?,
            chat_id: env::var("CHAT_ID")
                .context("CHAT_ID must be set")?
                .parse()
                .context("CHAT_ID must be a numeric chat identifier")?,
            owner_name: env::var("OWNER_NAME").context("OWNER_NAME must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            repo_clone_url: env::var("REPO_CLONE_URL").context("REPO_CLONE_URL must be set")?,
            telegram_api_base: env::var("TELEGRAM_API_BASE").ok(),
        })
    }
}
