use anyhow::{bail, Context, Result};

pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:5174",
];

/// Application configuration loaded from environment variables.
/// Only malformed numeric values fail; a missing API key is a valid operating mode.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when `OPENAI_API_KEY` is unset or blank.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub provider_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            _ => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let provider_timeout_secs: u64 = parse_or(&lookup, "PROVIDER_TIMEOUT_SECS", 30)?;
        if provider_timeout_secs == 0 {
            bail!("Environment variable 'PROVIDER_TIMEOUT_SECS' must be at least 1");
        }

        Ok(Config {
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origins,
            provider_timeout_secs,
            provider_max_retries: parse_or(&lookup, "PROVIDER_MAX_RETRIES", 0)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn key_loaded(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
