use crate::calculator::DEFAULT_MAX_INPUT;
use crate::config::AppConfig;
use crate::session::SessionRegistry;
use crate::stats::StatsStore;

/// Shared state handed to every route.
pub struct AppState {
    pub stats: StatsStore,
    pub sessions: SessionRegistry,
    /// Inputs above this are rejected before factorization.
    pub max_input: u64,
}

impl AppState {
    pub fn new(stats: StatsStore, sessions: SessionRegistry) -> Self {
        Self { stats, sessions, max_input: DEFAULT_MAX_INPUT }
    }

    pub fn with_max_input(mut self, max_input: u64) -> Self {
        self.max_input = max_input;
        self
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            StatsStore::open(cfg.stats_file.clone()),
            SessionRegistry::new(cfg.session_ttl).with_max_sessions(cfg.max_sessions),
        )
        .with_max_input(cfg.max_input)
    }
}
