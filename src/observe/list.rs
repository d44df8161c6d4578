//! Observed handle over a stored sequence

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::store::{StoreError, StoreResult};

use super::path::PathStep;
use super::{mutate_at, read_at, ObservedRoot, ObservedValue};

/// A live handle over a sequence nested somewhere in a stored value.
///
/// Mutations write the whole stored value through, same as
/// [`super::MapHandle`]. Positions are not stable identities: removing
/// or inserting elements shifts what later indices (and handles built
/// from them) refer to.
#[derive(Clone)]
pub struct ListHandle {
    root: Arc<ObservedRoot>,
    path: Vec<PathStep>,
}

impl ListHandle {
    pub(crate) fn new(root: Arc<ObservedRoot>, path: Vec<PathStep>) -> Self {
        Self { root, path }
    }

    fn child_path(&self, index: usize) -> Vec<PathStep> {
        let mut path = self.path.clone();
        path.push(PathStep::Index(index));
        path
    }

    /// Returns the element at `index`, observed; `None` when out of
    /// range.
    pub fn get(&self, index: usize) -> StoreResult<Option<ObservedValue>> {
        let child_path = self.child_path(index);
        read_at(&self.root, &self.path, |node| {
            let array = node.as_array().ok_or(StoreError::PathUnresolved)?;
            Ok(array
                .get(index)
                .map(|child| ObservedValue::from_node(&self.root, child_path, child)))
        })
    }

    /// Replaces the element at `index` and persists.
    pub fn set(&self, index: usize, value: Value) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            let len = array.len();
            let slot = array
                .get_mut(index)
                .ok_or(StoreError::OutOfBounds { index, len })?;
            *slot = value;
            Ok(())
        })
    }

    /// Appends an element and persists.
    pub fn push(&self, value: Value) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            array.push(value);
            Ok(())
        })
    }

    /// Inserts an element at `index`, shifting the tail, and persists.
    /// `index == len` appends.
    pub fn insert(&self, index: usize, value: Value) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            let len = array.len();
            if index > len {
                return Err(StoreError::OutOfBounds { index, len });
            }
            array.insert(index, value);
            Ok(())
        })
    }

    /// Removes the element at `index`, persists, and returns it.
    pub fn remove(&self, index: usize) -> StoreResult<Value> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            let len = array.len();
            if index >= len {
                return Err(StoreError::OutOfBounds { index, len });
            }
            Ok(array.remove(index))
        })
    }

    /// Removes and returns the last element, persisting; `None` when
    /// already empty.
    pub fn pop(&self) -> StoreResult<Option<Value>> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            Ok(array.pop())
        })
    }

    /// Appends every element of `values` with a single persist.
    pub fn extend(&self, values: Vec<Value>) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            array.extend(values);
            Ok(())
        })
    }

    /// Repeats the current contents until `count` copies exist, then
    /// persists. `repeat(2)` doubles the sequence; `repeat(0)` empties
    /// it.
    pub fn repeat(&self, count: usize) -> StoreResult<()> {
        mutate_at(&self.root, &self.path, |node| {
            let array = node.as_array_mut().ok_or(StoreError::PathUnresolved)?;
            let original = std::mem::take(array);
            for _ in 0..count {
                array.extend(original.iter().cloned());
            }
            Ok(())
        })
    }

    pub fn len(&self) -> StoreResult<usize> {
        read_at(&self.root, &self.path, |node| {
            let array = node.as_array().ok_or(StoreError::PathUnresolved)?;
            Ok(array.len())
        })
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a plain snapshot of the sequence, detached from the
    /// store.
    pub fn to_value(&self) -> StoreResult<Value> {
        read_at(&self.root, &self.path, |node| Ok(node.clone()))
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListHandle")
            .field("key", &self.root.key)
            .field("path", &self.path)
            .finish()
    }
}
