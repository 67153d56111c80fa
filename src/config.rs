use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::database::{IN_MEMORY_URL, models::MAX_USER_ID_LEN, retry::RetryPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_user_id: String,
    pub announcement_channel: String,
    pub announcement_hour: u32,
    pub announcement_minute: u32,
    pub store_retry_attempts: u32,
    pub store_retry_delay_ms: u64,
    pub host: String,
    pub port: u16,
    pub environment: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    pub fn from_env_only() -> Result<Self> {
        let config = Config {
            database_url: var_or("DATABASE_URL", IN_MEMORY_URL),
            admin_user_id: var_or("ADMIN_USER_ID", "admin"),
            announcement_channel: var_or("ANNOUNCEMENT_CHANNEL", "#general"),
            announcement_hour: parsed_or("ANNOUNCEMENT_HOUR", 9),
            announcement_minute: parsed_or("ANNOUNCEMENT_MINUTE", 0),
            store_retry_attempts: parsed_or("STORE_RETRY_ATTEMPTS", 3),
            store_retry_delay_ms: parsed_or("STORE_RETRY_DELAY_MS", 1000),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 5000),
            environment: var_or("ENVIRONMENT", "development"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.admin_user_id.trim().is_empty() {
            bail!("ADMIN_USER_ID must not be empty");
        }
        if self.admin_user_id.chars().count() > MAX_USER_ID_LEN {
            bail!("ADMIN_USER_ID must be at most {} characters", MAX_USER_ID_LEN);
        }
        if self.announcement_hour > 23 {
            bail!("ANNOUNCEMENT_HOUR must be 0-23, got {}", self.announcement_hour);
        }
        if self.announcement_minute > 59 {
            bail!(
                "ANNOUNCEMENT_MINUTE must be 0-59, got {}",
                self.announcement_minute
            );
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.store_retry_attempts,
            Duration::from_millis(self.store_retry_delay_ms),
        )
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
