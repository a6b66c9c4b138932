//! Bundle output record

use serde::{Deserialize, Serialize};

/// Final source text produced by a backend, plus an optional source map.
///
/// This is the only artifact handed back to callers, and the record stored
/// in each cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub source_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
}

impl Bundle {
    /// Create a bundle with code only
    pub fn new(source_code: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            source_map: None,
        }
    }

    /// Attach a source map
    pub fn with_source_map(mut self, map: impl Into<String>) -> Self {
        self.source_map = Some(map.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_and_omits_missing_map() {
        let json = serde_json::to_string(&Bundle::new("x")).unwrap();
        assert_eq!(json, r#"{"sourceCode":"x"}"#);

        let json = serde_json::to_string(&Bundle::new("x").with_source_map("{}")).unwrap();
        assert_eq!(json, r#"{"sourceCode":"x","sourceMap":"{}"}"#);
    }
}
