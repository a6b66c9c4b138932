//! Cache key derivation
//!
//! A key is a SHA-256 digest over the canonical JSON form of every input
//! that affects a backend's output. Object keys are sorted recursively so
//! two logically identical keys never diverge by field order.

use crate::error::BundleResult;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Structural key material for one bundle request
#[derive(Debug, Clone, Serialize)]
pub struct CacheKey<'a> {
    /// Backend identity, so two backends never share entries
    pub backend: &'a str,

    /// Source text after request resolution
    pub source_text: &'a str,

    /// Originating file path, if any
    pub path: Option<String>,

    /// Backend options, serialized
    pub options: Value,

    /// Backend-contributed material (e.g. scanned candidates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl<'a> CacheKey<'a> {
    /// Build key material from request inputs and serializable options
    pub fn new<O: Serialize + ?Sized>(
        backend: &'a str,
        source_text: &'a str,
        path: Option<&Path>,
        options: &O,
        extra: Option<Value>,
    ) -> BundleResult<Self> {
        Ok(Self {
            backend,
            source_text,
            path: path.map(|p| p.to_string_lossy().into_owned()),
            options: serde_json::to_value(options)?,
            extra,
        })
    }
}

/// Rebuild `value` with every object's keys in sorted order
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Compute the hex-encoded SHA-256 digest of `key`'s canonical form
pub fn compute_key<T: Serialize + ?Sized>(key: &T) -> BundleResult<String> {
    let canonical = canonicalize(serde_json::to_value(key)?);
    let bytes = serde_json::to_vec(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
