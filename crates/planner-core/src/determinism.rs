//! Determinism utilities for byte-stable serialization and hashing.
//!
//! Solver outputs (policies, PBVI belief sets) must be bit-identical across
//! runs for a fixed model, seed, and expansion rule (spec §5). This module
//! provides the canonical-JSON + SHA-256 fingerprinting machinery used to
//! verify that property in tests, and to stamp reproducibility fingerprints
//! onto solver outputs.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Precision for float normalization (1e-9 means 9 decimal places).
pub const FLOAT_PRECISION: f64 = 1e-9;

/// A deterministic fingerprint (SHA-256 hash in hex).
pub type Fingerprint = String;

/// Normalize a float to a fixed precision so floating-point noise does not
/// leak into fingerprints. NaN becomes `0.0`; infinities clamp to `f64::MAX`/`MIN`.
pub fn float_normalize(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value.is_infinite() {
        return if value.is_sign_positive() { f64::MAX } else { f64::MIN };
    }
    (value / FLOAT_PRECISION).round() * FLOAT_PRECISION
}

/// A canonical JSON value: sorted object keys, normalized floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum CanonicalValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    fn from_json_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CanonicalValue::Null,
            serde_json::Value::Bool(b) => CanonicalValue::Bool(*b),
            serde_json::Value::Number(n) => {
                CanonicalValue::Number(float_normalize(n.as_f64().unwrap_or(0.0)))
            }
            serde_json::Value::String(s) => CanonicalValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                CanonicalValue::Array(arr.iter().map(Self::from_json_value).collect())
            }
            serde_json::Value::Object(obj) => {
                let map = obj.iter().map(|(k, v)| (k.clone(), Self::from_json_value(v))).collect();
                CanonicalValue::Object(map)
            }
        }
    }
}

/// Serialize a value to canonical JSON bytes: sorted keys, normalized floats,
/// no trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Vec<u8> {
    let json_value = serde_json::to_value(value).expect("serialization failed");
    let canonical = CanonicalValue::from_json_value(&json_value);
    let mut bytes = serde_json::to_vec(&canonical).expect("canonical serialization failed");
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    bytes
}

/// SHA-256 of the given bytes, hex-encoded.
pub fn stable_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Canonical-JSON fingerprint of any serializable value.
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Fingerprint {
    stable_hash(&canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn float_normalize_eliminates_noise() {
        let sum = 0.1 + 0.2;
        assert!((float_normalize(sum) - 0.3).abs() < 1e-9);
        assert_eq!(float_normalize(f64::NAN), 0.0);
        assert_eq!(float_normalize(f64::INFINITY), f64::MAX);
    }

    #[test]
    fn canonical_json_is_key_order_independent() {
        let v1 = json!({"z": 1, "a": 2});
        let v2 = json!({"a": 2, "z": 1});
        assert_eq!(canonical_json(&v1), canonical_json(&v2));
    }

    #[test]
    fn stable_hash_is_deterministic() {
        let h1 = stable_hash(b"planner");
        let h2 = stable_hash(b"planner");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn compute_fingerprint_ignores_field_order() {
        #[derive(Serialize)]
        struct A {
            x: f64,
            y: f64,
        }
        let a = A { x: 1.0, y: 2.0 };
        assert_eq!(compute_fingerprint(&a), compute_fingerprint(&a));
    }
}
