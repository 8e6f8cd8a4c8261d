//! Object store collaborator.
//!
//! The signing endpoint never touches object data itself, but it can delete
//! an object on the uploader's behalf (cancel/delete) and look up an object's
//! size after an upload completes. [`ObjectStore`] is the boundary; the
//! server binary supplies an S3-backed implementation.

use std::future::Future;
use std::pin::Pin;

use dashmap::DashMap;

/// Errors returned by an [`ObjectStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
    },

    /// The backing service failed.
    #[error("object store failure: {0}")]
    Backend(String),
}

/// Boxed future returned by [`ObjectStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Operations the endpoint needs from the object store.
pub trait ObjectStore: Send + Sync + 'static {
    /// Delete an object.
    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ()>;

    /// Size of an object in bytes.
    fn object_size<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, u64>;
}

/// An in-memory object store keyed by `(bucket, key)`.
///
/// Holds only object sizes. Useful for local development and tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), u64>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object of the given size.
    pub fn insert(&self, bucket: impl Into<String>, key: impl Into<String>, size: u64) {
        self.objects.insert((bucket.into(), key.into()), size);
    }

    /// Whether an object exists.
    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_owned(), key.to_owned()))
    }
}

impl ObjectStore for MemoryObjectStore {
    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.objects
                .remove(&(bucket.to_owned(), key.to_owned()))
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                })
        })
    }

    fn object_size<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            self.objects
                .get(&(bucket.to_owned(), key.to_owned()))
                .map(|entry| *entry.value())
                .ok_or_else(|| StoreError::NotFound {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_should_report_size_and_delete() {
        let store = MemoryObjectStore::new();
        store.insert("b", "k", 42);

        assert_eq!(store.object_size("b", "k").await.unwrap(), 42);
        store.delete_object("b", "k").await.unwrap();
        assert!(!store.contains("b", "k"));
    }

    #[tokio::test]
    async fn test_should_fail_for_missing_object() {
        let store = MemoryObjectStore::new();
        assert!(matches!(
            store.delete_object("b", "missing").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.object_size("b", "missing").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
