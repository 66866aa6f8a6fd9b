//! Category tree node model.
//!
//! Nodes mirror the `DataNode` shape consumed by tree widgets: `key`, `title`,
//! optional `children` and an `isLeaf` flag. Anything else riding along on a
//! node (`familyCode`, `renderType`, `icon`, ...) is kept in an opaque
//! [`Payload`] that the engine never inspects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque extra fields attached to a node.
///
/// Cloning a node deep-copies its structure but shares the payload, so the
/// payload behaves like a handle that survives every clone-and-replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Arc<Map<String, Value>>);

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(Arc::new(fields))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// True when both payloads point at the same allocation.
    pub fn shares_with(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A single entry in the category hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub key: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,

    #[serde(default)]
    pub is_leaf: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,

    #[serde(flatten)]
    pub payload: Payload,
}

impl TreeNode {
    /// A leaf with no children.
    pub fn leaf(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            children: Vec::new(),
            is_leaf: true,
            code: None,
            library: None,
            payload: Payload::default(),
        }
    }

    /// A folder node holding `children`.
    pub fn folder(
        key: impl Into<String>,
        title: impl Into<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            children,
            is_leaf: false,
            ..Self::leaf(key, title)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_node_wire_shape() {
        let raw = json!({
            "key": "0-0",
            "title": "Passives",
            "children": [
                { "key": "0-0-0", "title": "Resistors", "isLeaf": true, "familyCode": "RES" }
            ]
        });

        let node: TreeNode = serde_json::from_value(raw).unwrap();
        assert!(!node.is_leaf);
        assert_eq!(node.children.len(), 1);

        let child = &node.children[0];
        assert!(child.is_leaf);
        assert_eq!(child.payload.get("familyCode"), Some(&json!("RES")));

        let back = serde_json::to_value(child).unwrap();
        assert_eq!(back["familyCode"], json!("RES"));
        assert!(back.get("children").is_none());
    }

    #[test]
    fn test_clone_shares_payload() {
        let payload: Payload = [("renderType".to_string(), json!("badge"))]
            .into_iter()
            .collect();
        let node = TreeNode::leaf("a", "A").with_payload(payload);

        let copy = node.clone();
        assert!(copy.payload.shares_with(&node.payload));
    }
}
