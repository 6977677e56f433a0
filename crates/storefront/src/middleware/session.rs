//! Session middleware configuration.
//!
//! Sessions are held in process memory by [`IdleSessionStore`]. A session
//! that sees no request for `QUICKKART_SESSION_IDLE_MINUTES` is dropped along
//! with its cart, and a server restart forgets every cart.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    session::{Id, Record},
    session_store,
};

use crate::config::QuickKartConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "quickkart_session";

/// Upper bound on concurrently held sessions; the least recently used go first.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store that evicts idle sessions.
#[derive(Clone)]
pub struct IdleSessionStore {
    records: Cache<Id, Record>,
}

impl IdleSessionStore {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle)
                .build(),
        }
    }
}

impl std::fmt::Debug for IdleSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleSessionStore")
            .field("sessions", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for IdleSessionStore {
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
        Ok(self.records.get(session_id).await)
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer with an idle-evicting in-memory store.
#[must_use]
pub fn create_session_layer(config: &QuickKartConfig) -> SessionManagerLayer<IdleSessionStore> {
    let idle_seconds = i64::try_from(config.session_idle.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(IdleSessionStore::new(config.session_idle))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::OffsetDateTime;

    use super::*;

    async fn session_count(store: &IdleSessionStore) -> u64 {
        store.records.run_pending_tasks().await;
        store.records.entry_count()
    }

    fn record() -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = IdleSessionStore::new(Duration::from_secs(60));
        let mut record = record();

        store.create(&mut record).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap().unwrap().id, record.id);

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
        assert_eq!(session_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = IdleSessionStore::new(Duration::from_millis(100));
        for _ in 0..50 {
            store.save(&record()).await.unwrap();
        }
        let last = record();
        store.save(&last).await.unwrap();
        assert_eq!(session_count(&store).await, 51);

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(store.load(&last.id).await.unwrap().is_none());
        assert_eq!(session_count(&store).await, 0);
    }
}
