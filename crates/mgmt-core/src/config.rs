use std::{env, fs, path::Path};

use chrono::Duration;

use crate::{cleanup::CleanupPolicy, errors::Error, Result};

pub const DISCORD_TOKEN_ENV: &str = "TREEDIAGRAM_DISCORD_TOKEN";
pub const DEFAULT_HTTP_PORT: u16 = 10002;

/// Discord caps a history page at 100 messages.
const MAX_PAGE_SIZE: usize = 100;
/// Discord rejects bulk deletes of messages older than 14 days.
const MAX_BULK_AGE_HOURS: u64 = 14 * 24;

/// Typed configuration for the management service.
#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub http_port: u16,
    pub cleanup: CleanupPolicy,
    pub ack_emoji: String,
}

impl Config {
    /// Load from the process environment (plus an optional `.env` file that
    /// never overrides variables already set).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = read_secret(&get, DISCORD_TOKEN_ENV);
        if discord_token.trim().is_empty() {
            return Err(Error::Config(format!(
                "{DISCORD_TOKEN_ENV} (or {DISCORD_TOKEN_ENV}_FILE) is required"
            )));
        }

        let http_port = match get("HTTP_PORT").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("invalid HTTP_PORT {raw:?}: {e}")))?,
            None => DEFAULT_HTTP_PORT,
        };

        let mut cleanup = CleanupPolicy::default();
        if let Some(emoji) = get("CLEAN_KEEP_EMOJI").and_then(non_empty) {
            cleanup.keep_emoji = emoji.trim().to_string();
        }
        if let Some(threshold) = parse_u64(&get, "CLEAN_WARNING_THRESHOLD") {
            cleanup.warning_threshold = threshold as usize;
        }
        if let Some(size) = parse_u64(&get, "CLEAN_PAGE_SIZE") {
            cleanup.page_size = (size as usize).clamp(1, MAX_PAGE_SIZE);
        }
        if let Some(message) = get("CLEAN_WARNING_MESSAGE").and_then(non_empty) {
            cleanup.warning_message = message.trim().to_string();
        }
        if let Some(hours) = parse_u64(&get, "CLEAN_BULK_MAX_AGE_HOURS") {
            cleanup.bulk_max_age = Duration::hours(hours.clamp(1, MAX_BULK_AGE_HOURS) as i64);
        }

        let ack_emoji = get("CLEAN_ACK_EMOJI")
            .and_then(non_empty)
            .unwrap_or_else(|| crate::cleanup::ACK_EMOJI.to_string());

        Ok(Self {
            discord_token,
            http_port,
            cleanup,
            ack_emoji,
        })
    }
}

/// Read a secret from `NAME`, falling back to the file named by `NAME_FILE`.
///
/// Returns an empty string when neither yields a value.
fn read_secret(get: &impl Fn(&str) -> Option<String>, name: &str) -> String {
    if let Some(value) = get(name).and_then(non_empty) {
        return value;
    }

    let Some(path) = get(&format!("{name}_FILE")).and_then(non_empty) else {
        return String::new();
    };

    match fs::read_to_string(path.trim()) {
        Ok(contents) => contents.trim_end().to_string(),
        Err(e) => {
            tracing::warn!(name, path = %path, error = %e, "could not read secret file");
            String::new()
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() || env::var_os(key).is_some() {
            continue;
        }

        let mut val = v.trim().to_string();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_u64(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    get(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
