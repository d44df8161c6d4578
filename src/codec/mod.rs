//! Value codec between raw stored text and decoded JSON values
//!
//! The canonical encoding is compact JSON with no insignificant
//! whitespace. `serde_json` is built without `preserve_order`, so
//! object keys serialize in sorted (BTreeMap) order and repeated
//! encodes of an unchanged value are byte-identical.
//!
//! The raw get/set surface of the store bypasses this module entirely;
//! a raw value is not required to decode.

mod errors;

pub use errors::{CodecError, CodecResult};

use serde_json::Value;

/// Encodes a decoded value into its canonical compact form.
///
/// Deterministic: the same value always produces the same text.
pub fn encode(value: &Value) -> String {
    // serde_json::Value serialization is infallible for tree-shaped data.
    value.to_string()
}

/// Decodes raw stored text into a value.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if the text is not valid JSON.
pub fn decode(raw: &str) -> CodecResult<Value> {
    serde_json::from_str(raw).map_err(CodecError::Malformed)
}
