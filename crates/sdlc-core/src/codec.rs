//! Canonical JSON serialization and content hashing.
//!
//! Two semantically equal values — regardless of the key order they were
//! built or deserialized in — must produce identical bytes and therefore
//! identical hashes. [`canonical_json`] re-keys every object into sorted
//! order (recursively); [`canonical_bytes`] serializes with no insignificant
//! whitespace; [`canonical_hash`] composes both with SHA-256.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::HashRef;

/// Recursively sort object keys so that semantically equal values serialize
/// identically. Arrays keep their input order — array order is significant.
pub fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(&String, &Value)> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), canonical_json(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}

/// Serialize a canonicalized value to bytes with no insignificant whitespace.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(&canonical_json(value)).expect("canonical json value always serializes")
}

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compute the canonical content hash of any serializable value.
///
/// This is the hash used everywhere an artifact needs to be addressed by
/// content: it is a function only of `value`'s declared fields (via
/// `Serialize`), never of ambient state like wall-clock time.
///
/// # Examples
///
/// ```
/// use sdlc_core::codec::canonical_hash;
/// use serde_json::json;
///
/// let a = json!({"b": 2, "a": 1});
/// let b = json!({"a": 1, "b": 2});
/// assert_eq!(canonical_hash(&a).hash, canonical_hash(&b).hash);
/// ```
pub fn canonical_hash<T: Serialize>(value: &T) -> HashRef {
    let as_value = serde_json::to_value(value).expect("value must serialize to json");
    let bytes = canonical_bytes(&as_value);
    HashRef {
        hash_alg: "sha256".to_string(),
        hash: sha256_hex(&bytes),
    }
}
