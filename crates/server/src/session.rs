//! Session management
//!
//! One session per conversation. Each holds the scripted dialogue state and
//! the delegated turn history; the async lock on the history guarantees at
//! most one outstanding delegated turn per session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use busgo_agent::DialogueState;
use busgo_core::Turn;

use crate::ServerError;

/// Session state
#[derive(Debug)]
pub struct Session {
    /// Session ID
    pub id: String,
    /// Creation time
    pub created_at: Instant,
    /// Last activity
    pub last_activity: RwLock<Instant>,
    /// Is active
    pub active: RwLock<bool>,
    /// Scripted (typed-chat) dialogue state
    pub chat_state: Mutex<DialogueState>,
    /// Delegated (voice-flow) turn history
    pub history: tokio::sync::Mutex<Vec<Turn>>,
    /// Turn count across both flows
    pub turn_count: RwLock<usize>,
}

impl Session {
    /// Create a new session
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
            chat_state: Mutex::new(DialogueState::default()),
            history: tokio::sync::Mutex::new(Vec::new()),
            turn_count: RwLock::new(0),
        }
    }

    /// Update last activity and bump the turn counter
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
        *self.turn_count.write() += 1;
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Close session
    pub fn close(&self) {
        *self.active.write() = false;
    }

    /// Is session active
    pub fn is_active(&self) -> bool {
        *self.active.read()
    }

    /// Turns processed so far
    pub fn turns(&self) -> usize {
        *self.turn_count.read()
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    /// Create a session manager with custom timeout and cleanup interval
    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    /// Start a background task that periodically removes expired sessions.
    ///
    /// Returns a shutdown sender that stops the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let before = manager.count();
                        manager.cleanup_expired();
                        let after = manager.count();
                        if before != after {
                            tracing::info!(
                                "Session cleanup: removed {} expired sessions ({} remaining)",
                                before - after,
                                after
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Create a new session
    pub fn create(&self) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::Session("Max sessions reached".to_string()));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(&id));
        sessions.insert(id.clone(), session.clone());

        tracing::info!("Created session: {}", id);

        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session
    pub fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.remove(id) {
            session.close();
            tracing::info!("Removed session: {}", id);
        }
    }

    /// Get active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Cleanup expired sessions
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions);
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            if let Some(session) = sessions.remove(&id) {
                session.close();
                tracing::info!("Expired session: {}", id);
            }
        }
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}
