use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String key/value store that outlives a single page view, standing in
/// for the browser's `localStorage`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalStorage {
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.items.insert(key.to_string(), value.to_string());
    }

    /// `true` only when the stored value is the string `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
