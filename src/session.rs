use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use crate::utils::hash;

pub const SESSION_COOKIE: &str = "pf_session";
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Per-browser-session state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub visitor_id: String,
    pub visit_recorded: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_visitor_id(hash::visitor_id())
    }

    pub fn with_visitor_id(visitor_id: impl Into<String>) -> Self {
        Self { visitor_id: visitor_id.into(), visit_recorded: false }
    }
}

impl Default for SessionContext {
    fn default() -> Self { Self::new() }
}

struct Entry {
    context: SessionContext,
    last_seen: Instant,
}

/// In-memory sessions keyed by an opaque cookie token.
pub struct SessionRegistry {
    ttl: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, max_sessions: DEFAULT_MAX_SESSIONS, sessions: Mutex::new(HashMap::new()) }
    }

    /// Caps the number of live sessions; the least recently seen one is
    /// evicted to make room.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Returns the token and context for `token`, starting a new session
    /// when the token is missing, unknown or expired.
    pub fn checkout(&self, token: Option<&str>) -> (String, SessionContext) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, e| now.duration_since(e.last_seen) <= self.ttl);

        if let Some(token) = token {
            if let Some(entry) = sessions.get_mut(token) {
                entry.last_seen = now;
                return (token.to_string(), entry.context.clone());
            }
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(t, _)| t.clone());
            match oldest {
                Some(t) => {
                    sessions.remove(&t);
                    debug!(token = %t, "evicted idle session");
                }
                None => break,
            }
        }

        let token = Uuid::new_v4().to_string();
        let context = SessionContext::new();
        sessions.insert(token.clone(), Entry { context: context.clone(), last_seen: now });
        (token, context)
    }

    /// Marks the session's visit as recorded. Only the first caller for a
    /// token gets the context back (with the flag still unset), so exactly
    /// one request records the visit.
    pub fn claim_visit(&self, token: &str) -> Option<SessionContext> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.get_mut(token)?;
        if entry.context.visit_recorded {
            return None;
        }
        let unclaimed = entry.context.clone();
        entry.context.visit_recorded = true;
        entry.last_seen = Instant::now();
        Some(unclaimed)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts the session token from a `Cookie` header value.
pub fn token_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

pub fn set_cookie_header(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_per_unknown_token() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let (t1, c1) = registry.checkout(None);
        let (t2, _) = registry.checkout(Some("not-a-session"));
        assert_ne!(t1, t2);
        assert_eq!(registry.len(), 2);
        assert!(!c1.visit_recorded);
        assert_eq!(c1.visitor_id.len(), 8);
    }

    #[test]
    fn test_claim_visit_is_visible_on_next_checkout() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let (token, ctx) = registry.checkout(None);
        let claimed = registry.claim_visit(&token).unwrap();
        assert_eq!(claimed, ctx);

        let (again, restored) = registry.checkout(Some(&token));
        assert_eq!(again, token);
        assert!(restored.visit_recorded);
        assert_eq!(restored.visitor_id, ctx.visitor_id);
    }

    #[test]
    fn test_claim_visit_once_across_overlapping_requests() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let (token, _) = registry.checkout(None);

        // Both requests read the session before either claims it.
        let (_, a) = registry.checkout(Some(&token));
        let (_, b) = registry.checkout(Some(&token));
        assert!(!a.visit_recorded && !b.visit_recorded);

        assert!(registry.claim_visit(&token).is_some());
        assert!(registry.claim_visit(&token).is_none());
        assert!(registry.claim_visit("unknown").is_none());
    }

    #[test]
    fn test_claim_visit_from_many_threads() {
        let registry = std::sync::Arc::new(SessionRegistry::new(Duration::from_secs(60)));
        let (token, _) = registry.checkout(None);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let token = token.clone();
                std::thread::spawn(move || registry.claim_visit(&token).is_some())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_session_cap_evicts_least_recent() {
        let registry = SessionRegistry::new(Duration::from_secs(60)).with_max_sessions(2);
        let (first, _) = registry.checkout(None);
        std::thread::sleep(Duration::from_millis(2));
        let (second, _) = registry.checkout(None);
        std::thread::sleep(Duration::from_millis(2));
        registry.checkout(Some(&first));
        std::thread::sleep(Duration::from_millis(2));

        let (third, _) = registry.checkout(None);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.checkout(Some(&first)).0, first);
        assert_eq!(registry.checkout(Some(&third)).0, third);
        assert_ne!(registry.checkout(Some(&second)).0, second);
    }

    #[test]
    fn test_expired_sessions_are_dropped() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let (token, _) = registry.checkout(None);
        std::thread::sleep(Duration::from_millis(5));
        let (fresh, _) = registry.checkout(Some(&token));
        assert_ne!(fresh, token);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_token_from_cookie() {
        assert_eq!(token_from_cookie("a=1; pf_session=abc-123; b=2"), Some("abc-123"));
        assert_eq!(token_from_cookie("pf_session="), None);
        assert_eq!(token_from_cookie("other=1"), None);
        assert!(set_cookie_header("xyz").starts_with("pf_session=xyz;"));
    }
}
