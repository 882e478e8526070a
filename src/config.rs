use anyhow::{Context, Result};
use std::time::Duration;

use crate::credentials::SelectionPolicy;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Key selected at startup. `None` leaves selection to `POST /api/credentials`.
    pub api_key: Option<String>,
    pub api_base: String,
    pub port: u16,
    pub video_poll_interval: Duration,
    pub selection_policy: SelectionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|k| std::env::var(k).ok())
            .filter(|k| !k.trim().is_empty());

        let port = match std::env::var("PORT") {
            Ok(v) => v.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        let poll_secs = match std::env::var("VIDEO_POLL_INTERVAL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .context("VIDEO_POLL_INTERVAL_SECS must be a whole number of seconds")?,
            Err(_) => 10,
        };

        let wait_secs = match std::env::var("CREDENTIAL_WAIT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .context("CREDENTIAL_WAIT_SECS must be a whole number of seconds")?,
            Err(_) => 30,
        };

        let selection_policy = parse_policy(
            std::env::var("CREDENTIAL_SELECTION").ok().as_deref(),
            Duration::from_secs(wait_secs),
        )?;

        Ok(Config {
            api_key,
            api_base: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            port,
            video_poll_interval: Duration::from_secs(poll_secs),
            selection_policy,
        })
    }
}

fn parse_policy(raw: Option<&str>, wait: Duration) -> Result<SelectionPolicy> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("optimistic") => Ok(SelectionPolicy::Optimistic),
        Some("await") => Ok(SelectionPolicy::AwaitConfirmation { timeout: wait }),
        Some(other) => anyhow::bail!("CREDENTIAL_SELECTION must be 'optimistic' or 'await', got '{other}'"),
    }
}
