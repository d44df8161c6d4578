//! Observed values: write-through handles over stored composites
//!
//! A structured `get` on the store returns an [`ObservedValue`]. Plain
//! values (null, booleans, numbers, strings) are returned by value;
//! maps and lists come back as live handles. Every mutating call on a
//! handle applies the change to an in-memory copy of the whole stored
//! value, re-encodes that entire value, and persists it under the key
//! it was retrieved with. No explicit save call exists.
//!
//! Indexing into a composite yields another handle sharing the same
//! root, identified by its path of steps from the root. A mutation
//! three levels deep therefore still triggers exactly one whole-value
//! write. Re-encoding the full value on every mutation is a deliberate
//! trade: no diffing, no partial-update races, at O(value size) cost
//! per mutation — stored values are expected to be small.
//!
//! Handles are ephemeral. They are never persisted themselves, and a
//! handle whose path stops resolving (its element was removed or
//! replaced through another handle) fails with
//! [`StoreError::PathUnresolved`] instead of resurrecting the element.

mod list;
mod map;
mod path;

pub use list::ListHandle;
pub use map::MapHandle;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::codec;
use crate::store::{Store, StoreError, StoreResult};

use path::PathStep;

/// Shared persistence root for a tree of handles.
///
/// One root exists per `get`; all handles derived from that `get` hold
/// the same `Arc`, so they observe each other's mutations and never
/// race on independent copies of the value.
pub(crate) struct ObservedRoot {
    store: Store,
    key: String,
    value: Mutex<Value>,
}

impl ObservedRoot {
    // The in-memory tree is restored on any failed mutation, so a
    // poisoned lock still guards a valid value.
    fn lock(&self) -> MutexGuard<'_, Value> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Runs a read-only closure against the value at `path`.
fn read_at<R>(
    root: &Arc<ObservedRoot>,
    path: &[PathStep],
    f: impl FnOnce(&Value) -> StoreResult<R>,
) -> StoreResult<R> {
    let guard = root.lock();
    let node = path::resolve(&guard, path).ok_or(StoreError::PathUnresolved)?;
    f(node)
}

/// Runs a mutating closure against the value at `path`, then persists
/// the re-encoded root value under the root key.
///
/// If the closure or the persist step fails, the in-memory tree is
/// rolled back so it stays aligned with the store.
fn mutate_at<R>(
    root: &Arc<ObservedRoot>,
    path: &[PathStep],
    f: impl FnOnce(&mut Value) -> StoreResult<R>,
) -> StoreResult<R> {
    let mut guard = root.lock();
    let before = guard.clone();

    let node = path::resolve_mut(&mut guard, path).ok_or(StoreError::PathUnresolved)?;
    let out = match f(node) {
        Ok(out) => out,
        Err(e) => {
            *guard = before;
            return Err(e);
        }
    };

    let encoded = codec::encode(&guard);
    if let Err(e) = root.store.set_raw(&root.key, encoded) {
        *guard = before;
        return Err(e);
    }

    Ok(out)
}

/// A decoded value retrieved from the store.
///
/// Plain variants are ordinary owned values; mutating them has no
/// effect on the store. `List` and `Map` are live handles whose
/// mutations write through.
pub enum ObservedValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(ListHandle),
    Map(MapHandle),
}

impl ObservedValue {
    /// Wraps a freshly decoded value retrieved under `key`.
    pub(crate) fn observe(store: Store, key: &str, value: Value) -> Self {
        let is_map = value.is_object();
        match value {
            Value::Null => ObservedValue::Null,
            Value::Bool(b) => ObservedValue::Bool(b),
            Value::Number(n) => ObservedValue::Number(n),
            Value::String(s) => ObservedValue::String(s),
            composite => {
                let root = Arc::new(ObservedRoot {
                    store,
                    key: key.to_string(),
                    value: Mutex::new(composite),
                });
                if is_map {
                    ObservedValue::Map(MapHandle::new(root, Vec::new()))
                } else {
                    ObservedValue::List(ListHandle::new(root, Vec::new()))
                }
            }
        }
    }

    /// Wraps a value nested inside an observed tree, lazily, sharing
    /// the parent's root.
    pub(crate) fn from_node(root: &Arc<ObservedRoot>, path: Vec<PathStep>, node: &Value) -> Self {
        match node {
            Value::Null => ObservedValue::Null,
            Value::Bool(b) => ObservedValue::Bool(*b),
            Value::Number(n) => ObservedValue::Number(n.clone()),
            Value::String(s) => ObservedValue::String(s.clone()),
            Value::Array(_) => ObservedValue::List(ListHandle::new(root.clone(), path)),
            Value::Object(_) => ObservedValue::Map(MapHandle::new(root.clone(), path)),
        }
    }

    /// Returns a plain value snapshot, detached from the store.
    pub fn to_value(&self) -> StoreResult<Value> {
        match self {
            ObservedValue::Null => Ok(Value::Null),
            ObservedValue::Bool(b) => Ok(Value::Bool(*b)),
            ObservedValue::Number(n) => Ok(Value::Number(n.clone())),
            ObservedValue::String(s) => Ok(Value::String(s.clone())),
            ObservedValue::List(handle) => handle.to_value(),
            ObservedValue::Map(handle) => handle.to_value(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ObservedValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ObservedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ObservedValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ObservedValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ObservedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListHandle> {
        match self {
            ObservedValue::List(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapHandle> {
        match self {
            ObservedValue::Map(handle) => Some(handle),
            _ => None,
        }
    }
}

impl fmt::Debug for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Null => f.write_str("Null"),
            ObservedValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ObservedValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            ObservedValue::String(s) => f.debug_tuple("String").field(s).finish(),
            ObservedValue::List(handle) => fmt::Debug::fmt(handle, f),
            ObservedValue::Map(handle) => fmt::Debug::fmt(handle, f),
        }
    }
}
