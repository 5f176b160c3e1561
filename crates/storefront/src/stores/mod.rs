//! Write-through state stores backed by the visitor's session.
//!
//! Each manager loads its snapshot, applies one mutation and writes the whole
//! snapshot back. Reads never fail: a missing or unreadable snapshot is an
//! empty one. Writes that fail are logged and swallowed; the caller keeps the
//! in-memory value as the truth for the current request. The session record
//! itself is flushed after the response, where
//! [`LenientStore`](crate::middleware::LenientStore) does the same for the
//! backing store.

mod cart;
mod wishlist;

pub use cart::CartManager;
pub use wishlist::WishlistManager;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_sessions::Session;

/// Errors from the underlying key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("store unavailable: {0}")]
    Backend(String),
}

/// Durable key-value storage scoped to one visitor.
pub trait StateStore: Send + Sync {
    /// Read and decode the value under `key`.
    fn read<T>(
        &self,
        key: &'static str,
    ) -> impl Future<Output = Result<Option<T>, StoreError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Encode and write `value` under `key`.
    fn write<T>(
        &self,
        key: &'static str,
        value: &T,
    ) -> impl Future<Output = Result<(), StoreError>> + Send
    where
        T: Serialize + Send + Sync;

    /// Drop whatever is stored under `key`.
    fn discard(&self, key: &'static str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl StateStore for Session {
    async fn read<T>(&self, key: &'static str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.get::<T>(key).await?)
    }

    async fn write<T>(&self, key: &'static str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Send + Sync,
    {
        Ok(self.insert(key, value).await?)
    }

    async fn discard(&self, key: &'static str) -> Result<(), StoreError> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// Load a snapshot, treating absence and corruption as the default value.
pub async fn load_or_default<S, T>(store: &S, key: &'static str) -> T
where
    S: StateStore,
    T: DeserializeOwned + Default + Send,
{
    match store.read::<T>(key).await {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable session snapshot");
            T::default()
        }
    }
}

/// Write a snapshot. Failures are logged, never returned.
pub async fn persist<S, T>(store: &S, key: &'static str, value: &T)
where
    S: StateStore,
    T: Serialize + Send + Sync,
{
    if let Err(e) = store.write(key, value).await {
        tracing::warn!(key, error = %e, "Failed to persist session snapshot");
    }
}

/// Remove a snapshot. Failures are logged, never returned.
pub async fn forget<S: StateStore>(store: &S, key: &'static str) {
    if let Err(e) = store.discard(key).await {
        tracing::warn!(key, error = %e, "Failed to remove session snapshot");
    }
}
