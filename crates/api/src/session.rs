//! Per-login session contexts.
//!
//! Everything a user builds up between requests lives in a [`SessionContext`]:
//! filter selections, the manual-entry draft, a staged import and a cached
//! copy of the roster. Contexts are created at login, looked up by the
//! token's `jti`, dropped at logout and expire after a period of inactivity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use roster_core::filter::FilterState;
use roster_core::importer::PendingImport;
use roster_core::partner::{PartnerForm, PartnerRecord};
use roster_db::{PartnerStore, StoreError};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// State of one logged-in user.
#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    pub username: String,
    pub filters: FilterState,
    pub form: PartnerForm,
    pub pending_import: Option<PendingImport>,
    cache: Option<Arc<Vec<PartnerRecord>>>,
}

impl SessionContext {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            filters: FilterState::new(),
            form: PartnerForm::default(),
            pending_import: None,
            cache: None,
        }
    }

    /// The base collection, loaded from `store` on first use and then served
    /// from the cache until [`invalidate`](Self::invalidate) is called.
    pub async fn records(
        &mut self,
        store: &dyn PartnerStore,
    ) -> Result<Arc<Vec<PartnerRecord>>, StoreError> {
        if let Some(cached) = &self.cache {
            return Ok(Arc::clone(cached));
        }
        let records = Arc::new(store.list().await?);
        tracing::debug!(
            session = %self.id,
            count = records.len(),
            "Session roster cache filled"
        );
        self.cache = Some(Arc::clone(&records));
        Ok(records)
    }

    /// Drop the cached roster so the next read goes to the store.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

/// Shared handle to a session; requests of one session serialize on it.
pub type SessionHandle = Arc<Mutex<SessionContext>>;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// All live sessions of the process.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Start a fresh session for `username` and return its id.
    ///
    /// Expired sessions are swept at the same time.
    pub async fn open(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            handle: Arc::new(Mutex::new(SessionContext::new(id, username))),
            last_seen: Instant::now(),
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);
        let purged = before - sessions.len();
        sessions.insert(id, entry);

        tracing::info!(%id, username, purged, live = sessions.len(), "Session opened");
        id
    }

    /// Look up a live session and mark it as used. Expired sessions are
    /// removed and reported as absent.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        if entry.last_seen.elapsed() >= self.idle_timeout {
            sessions.remove(&id);
            tracing::info!(%id, "Session expired");
            return None;
        }
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    /// End a session. Returns whether it existed.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(%id, "Session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
