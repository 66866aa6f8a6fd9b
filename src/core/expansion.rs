use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Keys currently shown expanded in the tree view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionState {
    expanded: IndexSet<String>,
    /// Set after search-driven expansion so the view also opens the parents
    /// of expanded keys; cleared once the user expands or collapses by hand.
    auto_expand_parent: bool,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> &IndexSet<String> {
        &self.expanded
    }

    pub fn auto_expand_parent(&self) -> bool {
        self.auto_expand_parent
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    pub fn expand(&mut self, key: impl Into<String>) {
        self.expanded.insert(key.into());
    }

    pub fn collapse(&mut self, key: &str) {
        self.expanded.shift_remove(key);
        self.auto_expand_parent = false;
    }

    /// User toggle from the view.
    pub fn toggle(&mut self, key: &str) {
        if !self.expanded.shift_remove(key) {
            self.expanded.insert(key.to_string());
        }
        self.auto_expand_parent = false;
    }

    /// Replaces the set with search results.
    pub fn reveal<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.expanded = keys.into_iter().collect();
        self.auto_expand_parent = true;
    }

    pub fn expand_all<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.expanded.extend(keys);
    }

    pub fn remove_keys<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            self.expanded.shift_remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
        self.auto_expand_parent = false;
    }
}
