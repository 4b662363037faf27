use crate::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

/// One reversible parameter override.
///
/// `path` is relative to the target store's state root. `old_value` is
/// `None` when the override created a key that did not exist before, and
/// `Some(Null)` when the key held an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub target_id: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub old_value: Option<serde_json::Value>,
    pub new_value: serde_json::Value,
    pub timestamp: Timestamp,
}

impl OverrideRecord {
    #[must_use]
    pub fn new(
        target_id: impl Into<String>,
        path: Vec<String>,
        old_value: Option<serde_json::Value>,
        new_value: serde_json::Value,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            path,
            old_value,
            new_value,
            timestamp: Timestamp::now(),
        }
    }

    /// Dotted form of the target and path, e.g. `scene.camera.zoom`.
    pub fn dotted(&self) -> String {
        let mut out = self.target_id.clone();
        for seg in &self.path {
            out.push('.');
            out.push_str(seg);
        }
        out
    }
}

/// A present field is `Some`, even when it is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
