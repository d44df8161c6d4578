//! Durability and failure-behavior tests: reopen after writes,
//! rejection of corrupt files, and intact prior state after failed
//! writes.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use localkv::{Store, StoreError};

#[test]
fn test_reopen_preserves_all_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");

    {
        let store = Store::open(&path).unwrap();
        store.set("structured", json!({"k": [1, 2]})).unwrap();
        store.set_raw("raw", "plain text, not JSON").unwrap();
        store.set("line\nkey", json!("v")).unwrap();
    }

    let store = Store::open(&path).unwrap();
    assert_eq!(
        store.get("structured").unwrap().to_value().unwrap(),
        json!({"k": [1, 2]})
    );
    // raw values round-trip byte-for-byte
    assert_eq!(store.get_raw("raw").unwrap(), "plain text, not JSON");
    assert_eq!(store.keys(), vec!["line\nkey", "raw", "structured"]);
}

#[test]
fn test_missing_file_is_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("never-written.db")).unwrap();

    assert!(store.keys().is_empty());
    assert!(store.get_raw("anything").unwrap_err().is_not_found());
}

#[test]
fn test_corrupt_backing_file_rejected_at_open() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");

    {
        let store = Store::open(&path).unwrap();
        store.set("k", json!("v")).unwrap();
    }

    let mut data = fs::read(&path).unwrap();
    let mid = data.len() / 2;
    data[mid] ^= 0xFF;
    fs::write(&path, &data).unwrap();

    let err = Store::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
}

#[test]
fn test_mutations_leave_only_the_backing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let store = Store::open(&path).unwrap();

    store.set("a", json!(1)).unwrap();
    store.set("b", json!(2)).unwrap();
    store.delete("a").unwrap();

    let names: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("store.db")]);
}

#[cfg(unix)]
#[test]
fn test_failed_write_keeps_prior_state() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let store = Store::open(&path).unwrap();
    store.set("k", json!("before")).unwrap();

    // make the directory unwritable so the temporary snapshot cannot
    // be created
    let readonly = fs::Permissions::from_mode(0o555);
    fs::set_permissions(temp_dir.path(), readonly).unwrap();

    let err = store.set("k", json!("after")).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    // neither memory nor disk moved
    assert_eq!(store.get("k").unwrap().as_str(), Some("before"));

    let writable = fs::Permissions::from_mode(0o755);
    fs::set_permissions(temp_dir.path(), writable).unwrap();

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.get("k").unwrap().as_str(), Some("before"));
}

#[cfg(unix)]
#[test]
fn test_failed_bulk_write_applies_nothing() {
    use std::collections::HashMap;
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let store = Store::open(&path).unwrap();
    store.set("existing", json!(1)).unwrap();

    let readonly = fs::Permissions::from_mode(0o555);
    fs::set_permissions(temp_dir.path(), readonly).unwrap();

    let mut entries = HashMap::new();
    entries.insert("x".to_string(), json!(10));
    entries.insert("y".to_string(), json!(20));
    assert!(store.set_bulk(entries).is_err());

    let writable = fs::Permissions::from_mode(0o755);
    fs::set_permissions(temp_dir.path(), writable).unwrap();

    assert_eq!(store.keys(), vec!["existing"]);
}

// A persistence failure during a handle mutation must raise at the
// mutating call and leave the stored value unchanged.
#[cfg(unix)]
#[test]
fn test_proxy_write_failure_surfaces_to_mutator() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let store = Store::open(&path).unwrap();
    store.set("k", json!({"a": 1})).unwrap();

    let observed = store.get("k").unwrap();
    let map = observed.as_map().unwrap();

    let readonly = fs::Permissions::from_mode(0o555);
    fs::set_permissions(temp_dir.path(), readonly).unwrap();

    let err = map.insert("a", json!(2)).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    let writable = fs::Permissions::from_mode(0o755);
    fs::set_permissions(temp_dir.path(), writable).unwrap();

    // the handle rolled back, the store never changed
    assert_eq!(map.to_value().unwrap(), json!({"a": 1}));
    assert_eq!(
        store.get("k").unwrap().to_value().unwrap(),
        json!({"a": 1})
    );
}
