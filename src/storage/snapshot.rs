//! Whole-file snapshot read and atomic replace
//!
//! The backing file is always replaced as a unit: serialize every
//! record to a temporary file in the same directory, fsync it, rename
//! it over the original, then fsync the directory so the rename itself
//! is durable. The rename is the commit point; until it completes the
//! previous snapshot remains untouched.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::StoreRecord;

/// Reads a snapshot file into an ordered key -> raw value map.
///
/// A missing file is an empty store. Truncated or checksum-failing
/// records abort the load with [`StorageError::Corruption`]; a snapshot
/// is never partially loaded.
pub fn read_snapshot(path: &Path) -> StorageResult<BTreeMap<String, String>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StorageError::io(
                format!("failed to read snapshot: {}", path.display()),
                e,
            ))
        }
    };

    let mut records = BTreeMap::new();
    let mut offset = 0usize;

    while offset < data.len() {
        let (record, consumed) = StoreRecord::deserialize(&data[offset..])
            .map_err(|e| StorageError::corruption_at_offset(offset as u64, e.to_string()))?;
        records.insert(record.key, record.value);
        offset += consumed;
    }

    Ok(records)
}

/// Atomically replaces the snapshot file with the given records.
///
/// Records are written in map (lexicographic key) order, so two
/// replaces of the same map produce byte-identical files.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the temporary file cannot be
/// written, fsynced, or renamed into place. The previous snapshot is
/// left intact in that case.
pub fn replace_snapshot(path: &Path, records: &BTreeMap<String, String>) -> StorageResult<()> {
    let tmp_path = tmp_sibling(path);

    let result = write_and_rename(path, &tmp_path, records);
    if result.is_err() {
        // The rename never happened; drop the orphaned temporary.
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_rename(
    path: &Path,
    tmp_path: &Path,
    records: &BTreeMap<String, String>,
) -> StorageResult<()> {
    let mut buf = Vec::new();
    for (key, value) in records {
        buf.extend_from_slice(&StoreRecord::new(key.clone(), value.clone()).serialize());
    }

    let mut tmp = File::create(tmp_path).map_err(|e| {
        StorageError::io(
            format!("failed to create temporary snapshot: {}", tmp_path.display()),
            e,
        )
    })?;

    tmp.write_all(&buf)
        .map_err(|e| StorageError::io("failed to write temporary snapshot", e))?;

    // fsync before rename: the commit point must only expose full files
    tmp.sync_all()
        .map_err(|e| StorageError::io("fsync failed on temporary snapshot", e))?;

    fs::rename(tmp_path, path).map_err(|e| {
        StorageError::io(
            format!("failed to rename snapshot into place: {}", path.display()),
            e,
        )
    })?;

    sync_parent_dir(path)
}

/// Temporary file next to the snapshot, so the rename stays on one
/// filesystem.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = File::open(parent).map_err(|e| {
            StorageError::io(
                format!("failed to open snapshot directory: {}", parent.display()),
                e,
            )
        })?;
        dir.sync_all()
            .map_err(|e| StorageError::io("fsync failed on snapshot directory", e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> StorageResult<()> {
    // Directory handles cannot be fsynced portably; the file rename is
    // still atomic at the filesystem level.
    Ok(())
}
