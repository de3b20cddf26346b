//! Server Configuration
//!
//! All settings come from the process environment. `main` loads a `.env`
//! file first, so the Google API key can live there as a local secret.

use crate::hedgehog::MAX_SESSION_TTL_MINUTES;
use std::env;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

/// Runtime configuration for the web server and the analysis client
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Google API key; `None` when unset or blank
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// Idle minutes before a session is discarded
    pub session_ttl_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

impl AppConfig {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid PORT value '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        let session_ttl_minutes = match lookup("SESSION_TTL_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| (1..=MAX_SESSION_TTL_MINUTES).contains(minutes))
                .unwrap_or_else(|| {
                    log::warn!(
                        "Invalid SESSION_TTL_MINUTES value '{}' (1..={}), using {}",
                        raw,
                        MAX_SESSION_TTL_MINUTES,
                        DEFAULT_SESSION_TTL_MINUTES
                    );
                    DEFAULT_SESSION_TTL_MINUTES
                }),
            None => defaults.session_ttl_minutes,
        };

        Self {
            host: non_blank(lookup("HOST")).unwrap_or(defaults.host),
            port,
            api_key: non_blank(lookup("GOOGLE_API_KEY")),
            model: non_blank(lookup("GEMINI_MODEL")).unwrap_or(defaults.model),
            api_base: non_blank(lookup("GEMINI_API_BASE"))
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            session_ttl_minutes,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
