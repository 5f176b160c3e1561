//! Session middleware configuration.
//!
//! Production uses a `SQLite` store from tower-sessions-sqlx-store; tests pass
//! `tower_sessions::MemoryStore`. Any `SessionStore` works.
//!
//! The session manager saves the record after the handler has produced its
//! response, and turns a failed save into a bare 500. Cart and wishlist
//! writes must not fail a request that already succeeded in memory, so the
//! store is wrapped in [`LenientStore`], which logs write failures instead.

use async_trait::async_trait;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fs_session";

/// Session expiry time in seconds (30 days).
///
/// Cart and wishlist live in the session, so it outlasts a browser restart.
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session store (`SqliteStore` in production)
/// * `base_url` - Public storefront URL; `https` enables secure cookies
#[must_use]
pub fn create_session_layer<Store>(
    store: Store,
    base_url: &str,
) -> SessionManagerLayer<LenientStore<Store>>
where
    Store: SessionStore + Clone,
{
    // Determine if we're in production (HTTPS)
    let is_secure = base_url.starts_with("https://");

    SessionManagerLayer::new(LenientStore::new(store))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

// =============================================================================
// LenientStore
// =============================================================================

/// Session store whose write failures are logged and reported as success.
///
/// Loads still fail normally; callers already treat an unreadable session as
/// empty.
#[derive(Debug, Clone)]
pub struct LenientStore<S> {
    inner: S,
}

impl<S> LenientStore<S> {
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> SessionStore for LenientStore<S>
where
    S: SessionStore + Clone,
{
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        if let Err(e) = self.inner.create(record).await {
            tracing::warn!(error = %e, "Failed to create session record, keeping in-memory state");
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        if let Err(e) = self.inner.save(record).await {
            tracing::warn!(error = %e, "Failed to save session record, keeping in-memory state");
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        self.inner.load(id).await
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        if let Err(e) = self.inner.delete(id).await {
            tracing::warn!(error = %e, "Failed to delete session record");
        }
        Ok(())
    }
}

/// Store that refuses every write, for exercising failure paths.
#[cfg(test)]
pub(crate) mod testing {
    use tower_sessions::MemoryStore;

    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct ReadOnlyStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl SessionStore for ReadOnlyStore {
        async fn create(&self, _record: &mut Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("database is locked".to_string()))
        }

        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("database is locked".to_string()))
        }

        async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
            self.inner.load(id).await
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("database is locked".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::Session;

    use super::testing::ReadOnlyStore;
    use super::*;

    #[tokio::test]
    async fn test_write_failures_are_absorbed() {
        let store = LenientStore::new(ReadOnlyStore::default());
        let session = Session::new(None, Arc::new(store), None);

        session.insert("cart", vec![1u32, 2]).await.ok();
        assert!(session.save().await.is_ok());
        assert!(session.delete().await.is_ok());
    }

    #[tokio::test]
    async fn test_unwrapped_store_reports_failures() {
        let session = Session::new(None, Arc::new(ReadOnlyStore::default()), None);

        session.insert("cart", vec![1u32, 2]).await.ok();
        assert!(session.save().await.is_err());
    }
}
