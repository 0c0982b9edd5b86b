use game_types::{SessionId, SessionStatus};
use std::time::{Duration, Instant};

/// What the cleanup pass needs to know about one in-memory session
#[derive(Debug, Clone, Copy)]
pub struct SessionActivity {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub last_activity: Instant,
}

pub struct SessionCleanup {
    pub retention: Duration, // how long finished sessions stay loaded
}

impl Default for SessionCleanup {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(30 * 60),
        }
    }
}

impl SessionCleanup {
    pub fn new(retention: Duration) -> Self {
        Self { retention }
    }

    /// Sessions that can be dropped from memory. Their stored rows are kept.
    pub fn evictable<I>(&self, sessions: I, now: Instant) -> Vec<SessionId>
    where
        I: IntoIterator<Item = SessionActivity>,
    {
        sessions
            .into_iter()
            .filter(|s| self.should_evict(s, now))
            .map(|s| s.session_id)
            .collect()
    }

    /// Waiting and running sessions always stay loaded
    pub fn should_evict(&self, session: &SessionActivity, now: Instant) -> bool {
        session.status.is_terminal()
            && now.saturating_duration_since(session.last_activity) >= self.retention
    }
}
