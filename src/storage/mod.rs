//! On-disk snapshot storage for the record store
//!
//! The backing file is a sequence of length-prefixed, checksummed
//! records. There is no append path: every mutation rewrites the whole
//! snapshot through an atomic replace (write a temporary file, fsync,
//! rename over the original, fsync the directory). A crash at any point
//! leaves either the old or the new complete file on disk.
//!
//! # Invariants
//!
//! - Length-prefixed framing: keys and values may contain any
//!   character, including newlines, without ambiguity.
//! - Every record carries a CRC32 trailer; a checksum failure on read
//!   aborts the load rather than returning a partial store.
//! - A completed `replace` leaves the file parseable back into exactly
//!   the map that was written.

mod checksum;
mod errors;
mod record;
mod snapshot;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{StorageError, StorageResult};
pub use record::StoreRecord;
pub use snapshot::{read_snapshot, replace_snapshot};
