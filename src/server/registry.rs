// ABOUTME: Tracks live sessions accepted by the server, keyed by session id and peer system_id
// ABOUTME: Grounded on the other example SMSC simulator's SessionManager, adapted to the teacher's tokio stack

use crate::session::SessionHandle;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Opaque handle identifying one accepted connection. Assigned sequentially
/// by the acceptor; distinct from the SMPP `sequence_number` field, which is
/// per-session and resets with each connection.
pub type SessionId = u64;

struct Entry {
    handle: SessionHandle,
    peer_system_id: Option<String>,
}

/// Live-session table for the acceptor. The teacher has no equivalent (it
/// only ever drives one outbound connection); this follows the structure of
/// `TheGU-rust-smpp-sim`'s `SessionManager` but swaps its `DashMap` for a
/// `tokio::sync::Mutex<HashMap<_>>` since this crate's dependency stack
/// doesn't carry `dashmap`.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: SessionId, handle: SessionHandle) {
        self.sessions.lock().await.insert(
            id,
            Entry {
                handle,
                peer_system_id: None,
            },
        );
    }

    pub async fn set_peer_system_id(&self, id: SessionId, system_id: String) {
        if let Some(entry) = self.sessions.lock().await.get_mut(&id) {
            entry.peer_system_id = Some(system_id);
        }
    }

    pub async fn remove(&self, id: SessionId) {
        self.sessions.lock().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Look up the session bound under `system_id`, used by `deliver_sm`
    /// routing. Returns `None` if no session has bound with that identity.
    pub async fn find_by_peer_system_id(&self, system_id: &str) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .await
            .values()
            .find(|entry| entry.peer_system_id.as_deref() == Some(system_id))
            .map(|entry| entry.handle.clone())
    }

    pub async fn all_handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .lock()
            .await
            .values()
            .map(|entry| entry.handle.clone())
            .collect()
    }
}
