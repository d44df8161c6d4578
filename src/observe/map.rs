//! Observed handle over a stored map

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::store::{StoreError, StoreResult};

use super::path::PathStep;
use super::{mutate_at, read_at, ObservedRoot, ObservedValue};

/// A live handle over a map nested somewhere in a stored value.
///
/// Every mutating call re-encodes the whole stored value and persists
/// it under the key it was retrieved with.
#[derive(Clone)]
pub struct MapHandle {
    root: Arc<ObservedRoot>,
    path: Vec<PathStep>,
}

impl MapHandle {
    pub(crate) fn new(root: Arc<ObservedRoot>, path: Vec<PathStep>) -> Self {
        Self { root, path }
    }

    fn child_path(&self, key: &str) -> Vec<PathStep> {
        let mut path = self.path.clone();
        path.push(PathStep::Key(key.to_string()));
        path
    }

    /// Returns the entry under `key`, observed: nested composites come
    /// back as handles sharing this handle's root.
    pub fn get(&self, key: &str) -> StoreResult<Option<ObservedValue>> {
        let child_path = self.child_path(key);
        read_at(&self.root, &self.path, |node| {
            let object = node.as_object().ok_or(StoreError::PathUnresolved)?;
            Ok(object
                .get(key)
                .map(|child| ObservedValue::from_node(&self.root, child_path, child)))
        })
    }

    /// Inserts or replaces the entry under `key` and persists.
    pub fn insert(&self, key: &str, value: Value) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let object = node.as_object_mut().ok_or(StoreError::PathUnresolved)?;
            object.insert(key.to_string(), value);
            Ok(())
        })
    }

    /// Removes the entry under `key`, persists, and returns the removed
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the entry is absent.
    pub fn remove(&self, key: &str) -> StoreResult<Value> {
        mutate_at(&self.root, &self.path, |node| {
            let object = node.as_object_mut().ok_or(StoreError::PathUnresolved)?;
            object.remove(key).ok_or_else(|| StoreError::not_found(key))
        })
    }

    /// Returns whether an entry exists under `key`.
    pub fn contains_key(&self, key: &str) -> StoreResult<bool> {
        read_at(&self.root, &self.path, |node| {
            let object = node.as_object().ok_or(StoreError::PathUnresolved)?;
            Ok(object.contains_key(key))
        })
    }

    /// Returns the entry keys in sorted order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        read_at(&self.root, &self.path, |node| {
            let object = node.as_object().ok_or(StoreError::PathUnresolved)?;
            Ok(object.keys().cloned().collect())
        })
    }

    pub fn len(&self) -> StoreResult<usize> {
        read_at(&self.root, &self.path, |node| {
            let object = node.as_object().ok_or(StoreError::PathUnresolved)?;
            Ok(object.len())
        })
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a plain snapshot of the map, detached from the store.
    pub fn to_value(&self) -> StoreResult<Value> {
        read_at(&self.root, &self.path, |node| Ok(node.clone()))
    }
}

impl fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapHandle")
            .field("key", &self.root.key)
            .field("path", &self.path)
            .finish()
    }
}
