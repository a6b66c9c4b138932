//! JSON deep merge

use serde_json::Value;

/// Merge `overrides` into `base`.
///
/// Objects merge key by key, recursively. Any other value in `overrides`
/// (arrays included) replaces the value in `base` wholesale.
pub fn deep_merge(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

/// Return a merged copy of `base` with `overrides` applied
pub fn merged(base: &Value, overrides: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, overrides);
    out
}
