//! Session middleware configuration.
//!
//! Sessions live in memory and the cookie has no max-age, so a reader is
//! signed out when the browser session ends or the portal restarts. The
//! store forgets sessions left idle and caps how many it holds at once.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, session_store};

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bb_session";

/// Sessions untouched for this long are dropped.
const SESSION_IDLE: Duration = Duration::from_secs(12 * 60 * 60);

/// Most sessions held at once; the least recently used go first.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store on a `moka` cache.
#[derive(Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    #[must_use]
    pub fn new(max_sessions: u64, idle: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Sessions currently held. Evictions are applied lazily, so call
    /// [`Self::run_pending_tasks`] first for an exact figure.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.records.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending evictions and bookkeeping.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks().await;
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, SESSION_IDLE)
    }
}

// Records hold bearer tokens; never print them.
impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("sessions", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self.records.get(session_id).await {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record)),
            Some(_) => {
                self.records.invalidate(session_id).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer(
    config: &PortalConfig,
    store: SessionCache,
) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time;

    use super::*;

    fn record(expires_in: time::Duration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = SessionCache::default();
        let mut rec = record(time::Duration::minutes(30));
        store.create(&mut rec).await.unwrap();
        assert_eq!(store.load(&rec.id).await.unwrap(), Some(rec.clone()));

        store.delete(&rec.id).await.unwrap();
        assert_eq!(store.load(&rec.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = SessionCache::default();
        let mut first = record(time::Duration::minutes(30));
        store.create(&mut first).await.unwrap();
        let mut second = record(time::Duration::minutes(30));
        second.id = first.id;
        store.create(&mut second).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped() {
        let store = SessionCache::default();
        let rec = record(time::Duration::minutes(-1));
        store.save(&rec).await.unwrap();
        assert_eq!(store.load(&rec.id).await.unwrap(), None);
        store.run_pending_tasks().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = SessionCache::new(10, SESSION_IDLE);
        for _ in 0..50 {
            let mut rec = record(time::Duration::minutes(30));
            store.create(&mut rec).await.unwrap();
        }
        store.run_pending_tasks().await;
        assert!(store.len() <= 10);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_forgotten() {
        let store = SessionCache::new(100, Duration::from_millis(50));
        let mut rec = record(time::Duration::minutes(30));
        store.create(&mut rec).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.load(&rec.id).await.unwrap(), None);
    }

    #[test]
    fn test_debug_hides_records() {
        let debug = format!("{:?}", SessionCache::default());
        assert_eq!(debug, "SessionCache { sessions: 0 }");
    }
}
