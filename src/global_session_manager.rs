use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::info;
use tokio::sync::Mutex as AsyncMutex;

use crate::models::user_session::UserSession;

pub type SharedSession = Arc<AsyncMutex<UserSession>>;

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

struct Sessions {
    entries: HashMap<String, Entry>,
    last_sweep: Instant,
}

/// Console sessions by session id. Each session sits behind its own async
/// lock, so requests from one browser run one at a time while different
/// browsers proceed in parallel.
///
/// With an idle timeout, sessions nobody has touched for that long are
/// dropped the next time a session is looked up. A session a request is
/// still holding is never dropped.
#[derive(Clone)]
pub struct GlobalSessionManager {
    sessions: Arc<Mutex<Sessions>>,
    idle_timeout: Option<Duration>,
}

impl Default for GlobalSessionManager {
    fn default() -> Self {
        GlobalSessionManager {
            sessions: Arc::new(Mutex::new(Sessions {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            idle_timeout: None,
        }
    }
}

impl GlobalSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts or replaces a session
    pub fn insert(&self, session_id: String, session: UserSession) -> SharedSession {
        let shared = Arc::new(AsyncMutex::new(session));
        let entry = Entry {
            session: shared.clone(),
            last_seen: Instant::now(),
        };
        self.sessions().entries.insert(session_id, entry);
        shared
    }

    pub fn get(&self, session_id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions();
        let entry = sessions.entries.get_mut(session_id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Returns the existing session or stores the one `create` builds.
    pub fn get_or_insert_with(&self, session_id: &str, create: impl FnOnce() -> UserSession) -> SharedSession {
        let mut sessions = self.sessions();
        self.sweep_if_due(&mut sessions);

        let entry = sessions
            .entries
            .entry(session_id.to_string())
            .or_insert_with(|| Entry {
                session: Arc::new(AsyncMutex::new(create())),
                last_seen: Instant::now(),
            });
        entry.last_seen = Instant::now();
        entry.session.clone()
    }

    pub fn remove(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions().entries.remove(session_id).map(|entry| entry.session)
    }

    /// Drops every idle session now, returning how many went.
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions();
        self.sweep(&mut sessions)
    }

    pub fn len(&self) -> usize {
        self.sessions().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep_if_due(&self, sessions: &mut Sessions) {
        let interval = match self.idle_timeout {
            Some(timeout) => timeout.min(MAX_SWEEP_INTERVAL),
            None => return,
        };
        if sessions.last_sweep.elapsed() >= interval {
            self.sweep(sessions);
        }
    }

    fn sweep(&self, sessions: &mut Sessions) -> usize {
        let timeout = match self.idle_timeout {
            Some(timeout) => timeout,
            None => return 0,
        };
        let before = sessions.entries.len();
        sessions
            .entries
            .retain(|_, entry| entry.last_seen.elapsed() < timeout || Arc::strong_count(&entry.session) > 1);
        sessions.last_sweep = Instant::now();

        let evicted = before - sessions.entries.len();
        if evicted > 0 {
            info!("Evicted {} idle console sessions", evicted);
        }
        evicted
    }
}
