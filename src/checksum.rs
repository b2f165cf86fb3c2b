//! Fingerprints for exported manager snapshots

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 fingerprint of serialized schema content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute from a JSON value, using its compact serialization
    pub fn from_json(value: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_bytes(canonical.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_consistency() {
        let value = json!({"id": "hrct_text_fields", "label": "Text Fields"});
        assert_eq!(Checksum::from_json(&value), Checksum::from_json(&value));
        assert_eq!(Checksum::from_json(&value).as_str().len(), 64);
    }

    #[test]
    fn test_checksum_verification() {
        let value = json!({"id": "a"});
        let checksum = Checksum::from_json(&value);
        assert!(checksum.verify_json(&value));
        assert!(!checksum.verify_json(&json!({"id": "b"})));
    }
}
