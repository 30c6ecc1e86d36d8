use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// A registry of active client sessions.
///
/// Hands each session a cancellation token so the listener can stop every
/// session on shutdown.
pub struct Registry {
    // session id -> token
    sessions: Mutex<HashMap<u64, CancellationToken>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a new session and returns its cancellation token.
    pub fn register(&self, session_id: u64) -> CancellationToken {
        let token = CancellationToken::new();
        self.sessions.lock().insert(session_id, token.clone());
        token
    }

    /// Unregisters a session when it terminates.
    pub fn unregister(&self, session_id: u64) {
        self.sessions.lock().remove(&session_id);
    }

    /// Cancels every registered session.
    pub fn cancel_all(&self) {
        for token in self.sessions.lock().values() {
            token.cancel();
        }
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
