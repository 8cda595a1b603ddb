//! Storage keys and pipeline results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::label::ClassificationLabel;

/// Object-storage key for one classified file, serialized as `<label>/<file_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey {
    pub label: ClassificationLabel,
    pub file_name: String,
}

impl StorageKey {
    pub fn new(label: ClassificationLabel, file_name: impl Into<String>) -> Self {
        Self {
            label,
            file_name: file_name.into(),
        }
    }

    /// The key as written to the bucket.
    pub fn as_key(&self) -> String {
        format!("{}/{}", self.label, self.file_name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.label, self.file_name)
    }
}

/// Ordered storage keys persisted by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineResult {
    keys: Vec<StorageKey>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: StorageKey) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[StorageKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Serialized keys in processing order.
    pub fn to_key_strings(&self) -> Vec<String> {
        self.keys.iter().map(StorageKey::as_key).collect()
    }
}

impl IntoIterator for PipelineResult {
    type Item = StorageKey;
    type IntoIter = std::vec::IntoIter<StorageKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}
