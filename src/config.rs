use serde::Deserialize;

use crate::auth::password;

/// Mail settings are optional on purpose: a missing value only surfaces on
/// the first send attempt, not at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailConfig {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub app_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub secret: String,
    pub session_ttl_minutes: i64,
    pub pbkdf2_rounds: u32,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:blog.db".into());
        let secret = std::env::var("APP_SECRET")?;
        let session_ttl_minutes = std::env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60 * 24 * 7);
        let pbkdf2_rounds = std::env::var("PBKDF2_ROUNDS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(password::DEFAULT_ROUNDS);
        let mail = MailConfig {
            sender: std::env::var("MAIL_SENDER").ok(),
            recipient: std::env::var("MAIL_RECIPIENT").ok(),
            app_password: std::env::var("MAIL_APP_PASSWORD").ok(),
        };
        Ok(Self {
            database_url,
            secret,
            session_ttl_minutes,
            pbkdf2_rounds,
            mail,
        })
    }
}
