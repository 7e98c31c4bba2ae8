use anyhow::Context;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → in-memory store (local development only).
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,

    pub claude_api_key: String,
    pub claude_model: String,
    pub ai_timeout_secs: u64,

    // Feedback window
    pub feedback_window_days: u32,
    pub feedback_min_records: usize,

    // Chat cooldowns
    pub focus_cooldown_secs: i64,
    pub lounge_cooldown_secs: i64,
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|extra| {
                    extra
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_default(),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            ai_timeout_secs: parsed_or("AI_TIMEOUT_SECS", 30)?,

            feedback_window_days: parsed_or("FEEDBACK_WINDOW_DAYS", 7)?,
            feedback_min_records: parsed_or("FEEDBACK_MIN_RECORDS", 2)?,

            focus_cooldown_secs: parsed_or("FOCUS_COOLDOWN_SECS", 600)?,
            lounge_cooldown_secs: parsed_or("LOUNGE_COOLDOWN_SECS", 10_800)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: "test-secret".into(),
            claude_api_key: String::new(),
            claude_model: "test-model".into(),
            ai_timeout_secs: 1,
            feedback_window_days: 7,
            feedback_min_records: 2,
            focus_cooldown_secs: 600,
            lounge_cooldown_secs: 10_800,
        }
    }
}
