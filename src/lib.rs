//! localkv - a locally persisted stand-in for a remote key-value database
//!
//! The store maps text keys to text values in exactly one backing file.
//! Values written through the structured surface are canonical compact
//! JSON; composite values retrieved through it come back as observed
//! handles whose in-place mutations are written through to the file.

pub mod codec;
pub mod global;
pub mod observability;
pub mod observe;
pub mod storage;
pub mod store;

pub use observe::{ListHandle, MapHandle, ObservedValue};
pub use store::{Store, StoreError};
