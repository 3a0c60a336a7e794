//! Live-session tracking and uid binding.

use super::Session;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use valkyr_proto::Frame;

/// Process-wide registry of live sessions.
///
/// Sessions are keyed by their accept-time id; the uid index is written by
/// the login handler and removed on disconnect, so online-target lookup
/// only ever sees authenticated sessions.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<u64, Arc<Session>>,
    by_uid: DashMap<u64, u64>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    pub fn register(
        &self,
        remote_addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Frame>,
    ) -> Arc<Session> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::new(id, remote_addr, outbound));
        self.sessions.insert(id, session.clone());
        session
    }

    /// Removes a session on disconnect, clearing its uid binding.
    pub async fn remove(&self, session_id: u64) {
        if let Some((_, session)) = self.sessions.remove(&session_id) {
            if let Some(uid) = session.uid().await {
                info!("👋 Player {uid} disconnected");
            }
            self.by_uid.retain(|_, sid| *sid != session_id);
        }
    }

    /// Binds an authenticated uid to its session. Called only by the login
    /// handler, immediately after the player is attached.
    pub fn bind_uid(&self, uid: u64, session_id: u64) {
        self.by_uid.insert(uid, session_id);
    }

    pub fn get(&self, session_id: u64) -> Option<Arc<Session>> {
        self.sessions.get(&session_id).map(|s| s.clone())
    }

    /// Looks up the online session for `uid`, if any.
    pub fn find_by_uid(&self, uid: u64) -> Option<Arc<Session>> {
        let session_id = *self.by_uid.get(&uid)?;
        self.get(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
