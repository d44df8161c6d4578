//! Process-wide default store
//!
//! Convenience handle for callers that want one store per process
//! without threading a `Store` through their code. The path is
//! configurable before first use; the store itself is opened lazily on
//! first access and never torn down. Tests and multi-store callers
//! should construct their own [`Store`] instances instead.

use std::path::PathBuf;

use once_cell::sync::OnceCell;

use crate::store::{Store, StoreResult};

/// Backing file used when no path was configured.
pub const DEFAULT_STORE_FILE: &str = "localkv.db";

static DEFAULT_PATH: OnceCell<PathBuf> = OnceCell::new();
static DEFAULT_STORE: OnceCell<Store> = OnceCell::new();

/// Configures the backing file path for the default store.
///
/// Returns `false` if the path was already set, or if the default
/// store was already opened (its path is fixed at that point).
pub fn set_default_path(path: impl Into<PathBuf>) -> bool {
    if DEFAULT_STORE.get().is_some() {
        return false;
    }
    DEFAULT_PATH.set(path.into()).is_ok()
}

/// Returns the process-wide default store, opening it on first use.
///
/// Uses the configured path, or [`DEFAULT_STORE_FILE`] in the working
/// directory when none was set.
pub fn store() -> StoreResult<&'static Store> {
    DEFAULT_STORE.get_or_try_init(|| {
        let path = DEFAULT_PATH.get_or_init(|| PathBuf::from(DEFAULT_STORE_FILE));
        Store::open(path)
    })
}
