use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::calculator::DEFAULT_MAX_INPUT;
use crate::session::DEFAULT_MAX_SESSIONS;
use crate::stats::store::DEFAULT_STATS_FILE;

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub max_connections: usize,
    pub rate_limit_per_sec: usize,
    pub stats_file: PathBuf,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub max_input: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            max_connections: 64,
            rate_limit_per_sec: 200,
            stats_file: PathBuf::from(DEFAULT_STATS_FILE),
            session_ttl: Duration::from_secs(1800),
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_input: DEFAULT_MAX_INPUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key lookup; unset or unparseable values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_var = |name: &str, default: usize| {
            lookup(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            bind_addr: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_addr),
            max_connections: parse_var("MAX_CONNECTIONS", defaults.max_connections),
            rate_limit_per_sec: parse_var("RATE_LIMIT_PER_SEC", defaults.rate_limit_per_sec),
            stats_file: lookup("STATS_FILE").map(PathBuf::from).unwrap_or(defaults.stats_file),
            session_ttl: Duration::from_secs(
                parse_var("SESSION_TTL_SECS", defaults.session_ttl.as_secs() as usize) as u64,
            ),
            max_sessions: parse_var("MAX_SESSIONS", defaults.max_sessions),
            max_input: lookup("MAX_INPUT")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&max| max >= 1)
                .unwrap_or(defaults.max_input),
        }
    }
}
