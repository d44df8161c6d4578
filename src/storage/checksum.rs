//! CRC32 checksums for snapshot records
//!
//! Every record in the backing file carries a CRC32 (IEEE polynomial)
//! trailer. Any mismatch on read aborts the snapshot load.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}
