//! Snapshot record framing
//!
//! Each record in the backing file has the layout:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, total including this field)
//! +------------------+
//! | Key              | (length-prefixed UTF-8)
//! +------------------+
//! | Value            | (length-prefixed UTF-8)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over length + key + value)
//! +------------------+
//! ```
//!
//! Length prefixes make the framing delimiter-free: a key or value may
//! contain newlines or any other control character without ever being
//! confused with a record boundary.

use std::io::{self, Read};

/// A single (key, value) record as framed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    /// Record key, arbitrary text
    pub key: String,
    /// Raw stored value, arbitrary text
    pub value: String,
}

/// Smallest possible record: length + two empty strings + checksum.
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 4;

impl StoreRecord {
    /// Create a record from a key and raw value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Serialize the record body (key and value, length-prefixed).
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + self.key.len() + self.value.len());

        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.key.as_bytes());

        buf.extend_from_slice(&(self.value.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.value.as_bytes());

        buf
    }

    /// Serialize the complete record to bytes.
    ///
    /// The checksum covers the length prefix and the body.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut checksum_data = Vec::with_capacity(4 + body.len());
        checksum_data.extend_from_slice(&record_length.to_le_bytes());
        checksum_data.extend_from_slice(&body);
        let checksum = super::checksum::compute_checksum(&checksum_data);

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying the checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        if !super::checksum::verify_checksum(&data[0..checksum_offset], stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "checksum mismatch",
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
            let mut len_buf = [0u8; 4];
            reader.read_exact(&mut len_buf)?;
            let len = u32::from_le_bytes(len_buf) as usize;

            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;

            String::from_utf8(buf).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("invalid UTF-8: {}", e))
            })
        }

        let key = read_string(&mut cursor)?;
        let value = read_string(&mut cursor)?;

        Ok((Self { key, value }, record_length))
    }
}
