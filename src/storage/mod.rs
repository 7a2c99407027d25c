//! Storage collaborator interfaces.
//!
//! Ownership model:
//! - `ObjectStore` is the engine-facing interface for listing, reading, and
//!   writing named blobs. Handles are constructor-injected, never global.
//! - `InMemoryObjectStore` backs tests and small fixtures.
//! - Filesystem-backed storage lives in `crate::transport::fs`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use bytes::Bytes;

use crate::errors::SeriesError;
use crate::types::{ObjectName, ObjectPrefix};

/// Prefix-listable blob storage.
///
/// Object names are `/`-separated. `list_objects` must return every name that
/// starts with `prefix`; ordering is not required (callers sort).
pub trait ObjectStore: Send + Sync {
    /// Enumerate all object names starting with `prefix`.
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectName>, SeriesError>;
    /// Fetch the full contents of one object.
    fn read_object(&self, name: &str) -> Result<Bytes, SeriesError>;
    /// Store an object. Fails with `PartitionExists` when `name` is taken.
    fn write_object(&self, name: &str, data: Bytes) -> Result<(), SeriesError>;
}

/// In-memory object store for tests and small datasets.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectName, Bytes>>,
}

impl InMemoryObjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store preloaded with `(name, bytes)` pairs.
    pub fn with_objects<I, N>(objects: I) -> Self
    where
        I: IntoIterator<Item = (N, Bytes)>,
        N: Into<ObjectName>,
    {
        let objects = objects
            .into_iter()
            .map(|(name, data)| (name.into(), data))
            .collect();
        Self {
            objects: RwLock::new(objects),
        }
    }

    /// Insert or replace an object without the exists check.
    pub fn put(&self, name: impl Into<ObjectName>, data: impl Into<Bytes>) -> Result<(), SeriesError> {
        let name = name.into();
        let mut guard = self.objects.write().map_err(|_| poisoned(&name))?;
        guard.insert(name, data.into());
        Ok(())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectName>, SeriesError> {
        let guard = self.objects.read().map_err(|_| poisoned(prefix))?;
        Ok(guard
            .range::<ObjectPrefix, _>(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn read_object(&self, name: &str) -> Result<Bytes, SeriesError> {
        let guard = self.objects.read().map_err(|_| poisoned(name))?;
        guard
            .get(name)
            .cloned()
            .ok_or_else(|| SeriesError::StorageUnavailable {
                location: name.to_string(),
                reason: "object not found".to_string(),
            })
    }

    fn write_object(&self, name: &str, data: Bytes) -> Result<(), SeriesError> {
        let mut guard = self.objects.write().map_err(|_| poisoned(name))?;
        if guard.contains_key(name) {
            return Err(SeriesError::PartitionExists(name.to_string()));
        }
        guard.insert(name.to_string(), data);
        Ok(())
    }
}

fn poisoned(location: &str) -> SeriesError {
    SeriesError::StorageUnavailable {
        location: location.to_string(),
        reason: "in-memory store lock poisoned".to_string(),
    }
}
