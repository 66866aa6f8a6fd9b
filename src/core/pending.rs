//! Pending items: catalog picks waiting to be placed into the tree.

use serde::{Deserialize, Serialize};

use crate::core::node::{Payload, TreeNode};

/// A category/attribute bundle selected from the catalog browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItem {
    pub key: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Breadcrumb path in the source catalog, e.g. `Passives / Resistors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    #[serde(flatten)]
    pub payload: Payload,
}

impl PendingItem {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            code: None,
            path: None,
            library: None,
            attributes: Vec::new(),
            payload: Payload::default(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// The leaf node this item becomes once assigned.
    pub fn to_node(&self) -> TreeNode {
        TreeNode {
            key: self.key.clone(),
            title: self.title.clone(),
            children: Vec::new(),
            is_leaf: true,
            code: self.code.clone(),
            library: self.library.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Keys of `items` in their current order.
pub fn keys_of(items: &[PendingItem]) -> Vec<&str> {
    items.iter().map(|i| i.key.as_str()).collect()
}
