use std::str::FromStr;

use anyhow::{Context, Result};

use crate::pipeline::controller::PersistencePolicy;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    /// Admin routes reject every request when unset.
    pub admin_token: Option<String>,
    pub persistence_policy: PersistencePolicy,
    pub profile_cache_ttl_secs: u64,
    pub ai_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            persistence_policy: parse_env_or("PERSISTENCE_POLICY", PersistencePolicy::BestEffort)?,
            profile_cache_ttl_secs: require_positive(
                "PROFILE_CACHE_TTL_SECS",
                parse_env_or("PROFILE_CACHE_TTL_SECS", 86_400)?,
            )?,
            ai_max_attempts: parse_env_or("AI_MAX_ATTEMPTS", 1u32)?.max(1),
            port: parse_env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Redis rejects `SET .. EX 0`, so a zero TTL would break every cache refresh.
fn require_positive(key: &str, value: u64) -> Result<u64> {
    if value == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(value)
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cache_ttl_is_rejected() {
        assert!(require_positive("PROFILE_CACHE_TTL_SECS", 0).is_err());
        assert_eq!(
            require_positive("PROFILE_CACHE_TTL_SECS", 60).unwrap(),
            60
        );
    }
}
