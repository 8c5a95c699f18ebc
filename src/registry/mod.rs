//! Filter description registry with late-bound server keys
//!
//! Maps a stable column identity to its [`FilterDescription`] and,
//! separately, to the server-side filter key. The two maps are deliberately
//! decoupled: server keys are reused across tables with different meanings,
//! so the same description can be registered under different keys per table
//! and the key binding is resolved late, at column-merge time.

use crate::core::filter::FilterDescription;
use std::collections::HashMap;

/// Per-table catalog of filter descriptions and key bindings
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    /// column identity -> filter description
    descriptions: HashMap<String, FilterDescription>,
    /// column identity -> server-side filter key
    keys: HashMap<String, String>,
}

impl FilterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a description for a column identity
    pub fn register(&mut self, column: impl Into<String>, description: FilterDescription) {
        self.descriptions.insert(column.into(), description);
    }

    /// Bind a column identity to its server-side filter key
    pub fn bind_key(&mut self, column: impl Into<String>, key: impl Into<String>) {
        self.keys.insert(column.into(), key.into());
    }

    /// Register a description and its key binding in one step
    pub fn register_with_key(
        &mut self,
        column: impl Into<String>,
        key: impl Into<String>,
        description: FilterDescription,
    ) {
        let column = column.into();
        self.bind_key(column.clone(), key);
        self.register(column, description);
    }

    /// Look up the description registered for a column identity
    pub fn description_for(&self, column: &str) -> Option<&FilterDescription> {
        self.descriptions.get(column)
    }

    /// Resolve the server-side filter key for a column identity
    ///
    /// A description without a key binding is a configuration problem; the
    /// column merger logs it and renders the column without filtering.
    pub fn key_for(&self, column: &str) -> Option<&str> {
        self.keys.get(column).map(|key| key.as_str())
    }

    /// All registered column identities
    pub fn columns(&self) -> Vec<&str> {
        self.descriptions.keys().map(|column| column.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
