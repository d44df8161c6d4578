//! The record store: a file-backed key -> raw value map
//!
//! `Store` is the public surface of the crate. It keeps the full set of
//! records in an ordered in-memory map (the key index) guarded by a
//! `RwLock`, and mirrors every mutation to the backing file through an
//! atomic snapshot replace before committing it in memory. On failure
//! both disk and memory keep the prior state.
//!
//! Two surfaces are exposed:
//!
//! - raw: `get_raw`/`set_raw`/`set_bulk_raw` move text in and out
//!   verbatim, with no grammar applied.
//! - structured: `get`/`set`/`set_bulk` compose the codec; composite
//!   values retrieved through `get` come back as observed handles that
//!   write mutations through to the store.

mod errors;

pub use errors::{StoreError, StoreResult};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::codec;
use crate::observability::{Logger, Severity};
use crate::observe::ObservedValue;
use crate::storage::{read_snapshot, replace_snapshot};

/// A file-backed key-value store.
///
/// Cloning is cheap and clones share the same underlying store; this is
/// how observed handles keep a back-reference for write-through.
///
/// Mutations serialize on a write lock around the
/// compute-persist-commit sequence, so concurrent in-process writers
/// cannot lose updates. Cross-process writers sharing one backing file
/// are limited to last-writer-wins; the atomic replace only guarantees
/// the file itself is never torn.
#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Path to the backing file
    path: PathBuf,
    /// Key index and record cache, always in sync with the backing file
    records: RwLock<BTreeMap<String, String>>,
}

impl Store {
    /// Opens the store backed by the file at `path`.
    ///
    /// A missing file is treated as an empty store until the first
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the file exists but cannot be
    /// read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records = read_snapshot(&path)?;

        Logger::emit(
            Severity::Info,
            "store_opened",
            &[
                ("path", &path.display().to_string()),
                ("records", &records.len().to_string()),
            ],
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                records: RwLock::new(records),
            }),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns the exact raw text stored under `key`.
    pub fn get_raw(&self, key: &str) -> StoreResult<String> {
        let records = self.read_guard();
        records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key))
    }

    /// Stores `value` under `key` verbatim, bypassing the codec.
    ///
    /// Creates or overwrites the record; never fails on an existing
    /// key.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) -> StoreResult<()> {
        let mut records = self.write_guard();
        let mut next = records.clone();
        next.insert(key.to_string(), value.into());
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    /// Deletes the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is absent.
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        let mut records = self.write_guard();
        if !records.contains_key(key) {
            return Err(StoreError::not_found(key));
        }
        let mut next = records.clone();
        next.remove(key);
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    /// Returns all keys in lexicographic order.
    ///
    /// The result is a snapshot: mutations after the call do not affect
    /// a returned sequence.
    pub fn keys(&self) -> Vec<String> {
        self.read_guard().keys().cloned().collect()
    }

    /// Returns all keys starting with `prefix`, in lexicographic order.
    ///
    /// Matching is over the raw key text, control characters included.
    /// `prefix("")` is equivalent to `keys()`.
    pub fn prefix(&self, prefix: &str) -> Vec<String> {
        if prefix.is_empty() {
            return self.keys();
        }
        self.read_guard()
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Applies a batch of raw writes with a single snapshot replace.
    ///
    /// All-or-nothing: on failure neither disk nor memory changes.
    pub fn set_bulk_raw(&self, entries: HashMap<String, String>) -> StoreResult<()> {
        let mut records = self.write_guard();
        let mut next = records.clone();
        next.extend(entries);
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    /// Retrieves the decoded value stored under `key`.
    ///
    /// Composite values (maps and lists) come back as observed handles;
    /// mutating them re-encodes the whole value and persists it under
    /// `key`. Plain values are returned by value and carry no
    /// back-reference.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the key is absent,
    /// [`StoreError::Malformed`] if the raw text does not decode.
    pub fn get(&self, key: &str) -> StoreResult<ObservedValue> {
        let raw = self.get_raw(key)?;
        let value = codec::decode(&raw)?;
        Ok(ObservedValue::observe(self.clone(), key, value))
    }

    /// Encodes `value` canonically and stores it under `key`.
    pub fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.set_raw(key, codec::encode(&value))
    }

    /// Encodes each value and applies the batch with a single snapshot
    /// replace.
    pub fn set_bulk(&self, entries: HashMap<String, Value>) -> StoreResult<()> {
        let raw = entries
            .into_iter()
            .map(|(k, v)| (k, codec::encode(&v)))
            .collect();
        self.set_bulk_raw(raw)
    }

    /// Persists `next` as the new snapshot, logging failures before
    /// surfacing them.
    fn persist(&self, next: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Err(e) = replace_snapshot(&self.inner.path, next) {
            Logger::emit(
                Severity::Error,
                "snapshot_replace_failed",
                &[
                    ("path", &self.inner.path.display().to_string()),
                    ("error", &e.to_string()),
                ],
            );
            return Err(e.into());
        }
        Ok(())
    }

    // A poisoned lock still guards a consistent map: mutations commit
    // in memory only after the snapshot replace succeeded.
    fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.inner
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.inner
            .records
            .write()
            .unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_store(temp_dir: &TempDir) -> Store {
        Store::open(temp_dir.path().join("test.db")).unwrap()
    }

    #[test]
    fn test_get_missing_key_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        assert!(store.get("absent").unwrap_err().is_not_found());
        assert!(store.get_raw("absent").unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.set("key", json!("value")).unwrap();
        assert_eq!(store.get("key").unwrap().to_value().unwrap(), json!("value"));
    }

    #[test]
    fn test_delete_removes_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.set("key", json!("value")).unwrap();
        store.delete("key").unwrap();
        assert!(store.get("key").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_key_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        assert!(store.delete("absent").unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_raw_bypasses_codec() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.set_raw("k", "not json at all").unwrap();
        assert_eq!(store.get_raw("k").unwrap(), "not json at all");
        assert!(matches!(
            store.get("k").unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[test]
    fn test_keys_ordered_and_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.set_raw("b", "2").unwrap();
        store.set_raw("a", "1").unwrap();
        store.set_raw("c", "3").unwrap();

        let keys = store.keys();
        assert_eq!(keys, vec!["a", "b", "c"]);

        // later mutations do not affect the returned snapshot
        store.delete("b").unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(store.keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_prefix_scan() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.set_raw("app:a", "1").unwrap();
        store.set_raw("app:b", "2").unwrap();
        store.set_raw("cfg:x", "3").unwrap();

        assert_eq!(store.prefix("app:"), vec!["app:a", "app:b"]);
        assert_eq!(store.prefix(""), store.keys());
        assert!(store.prefix("zzz").is_empty());
    }

    #[test]
    fn test_prefix_matches_newline_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        let key = "with\nnewline";
        store.set_raw(key, "v").unwrap();

        assert_eq!(store.prefix(key), vec![key.to_string()]);
    }

    #[test]
    fn test_bulk_raw_single_pass() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        let mut entries = HashMap::new();
        entries.insert("bulk1".to_string(), "val1".to_string());
        entries.insert("bulk2".to_string(), "val2".to_string());
        store.set_bulk_raw(entries).unwrap();

        assert_eq!(store.get_raw("bulk1").unwrap(), "val1");
        assert_eq!(store.get_raw("bulk2").unwrap(), "val2");
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");

        {
            let store = Store::open(&path).unwrap();
            store.set("durable", json!({"n": 1})).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(
            store.get("durable").unwrap().to_value().unwrap(),
            json!({"n": 1})
        );
    }
}
