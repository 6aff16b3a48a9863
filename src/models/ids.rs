//! Player and game identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Character identifier as assigned by the game.
pub type CharacterId = u32;

/// Dan rank on the ranked ladder (0 = Beginner, ascending).
pub type Rank = u32;

/// Battle timestamp in unix seconds.
pub type Timestamp = i64;

/// Stable per-player identifier (Polaris ID).
///
/// Distinct from the session `user_id`, which can change between
/// game versions.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolarisId(String);

impl PolarisId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolarisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PolarisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolarisId({})", self.0)
    }
}

impl From<String> for PolarisId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PolarisId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polaris_id_serializes_as_plain_string() {
        let id = PolarisId::from("3fGh2QmrR7Jd");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"3fGh2QmrR7Jd\"");

        let deserialized: PolarisId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_polaris_id_display() {
        let id = PolarisId::new("abc123".to_string());
        assert_eq!(format!("{}", id), "abc123");
    }

    #[test]
    fn test_polaris_id_debug() {
        let id = PolarisId::from("debug-test");
        assert!(format!("{:?}", id).contains("debug-test"));
    }

    #[test]
    fn test_polaris_id_ordering() {
        let a = PolarisId::from("a");
        let b = PolarisId::from("b");
        assert!(a < b);
        assert_eq!(a, PolarisId::from("a".to_string()));
    }
}
