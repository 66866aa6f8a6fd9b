//! Drop-position resolution for drag-and-drop.
//!
//! Tree widgets report a drop as `(drop_to_gap, drop_position)` where the
//! position is relative to the drop node: `-1` above, `0` on the body, `1`
//! below. That encoding stops here; the rest of the crate works with
//! [`DropPlacement`].

use serde::{Deserialize, Serialize};

use crate::core::{
    expansion::ExpansionState,
    node::TreeNode,
    store::{TreeError, find_by_key},
};

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    pub drag_key: String,
    pub drop_key: String,
    pub drop_to_gap: bool,
    pub drop_position: i32,
}

impl DropEvent {
    /// Dropped on the body of `drop_key`.
    pub fn onto(drag_key: impl Into<String>, drop_key: impl Into<String>) -> Self {
        Self {
            drag_key: drag_key.into(),
            drop_key: drop_key.into(),
            drop_to_gap: false,
            drop_position: 0,
        }
    }

    pub fn above(drag_key: impl Into<String>, drop_key: impl Into<String>) -> Self {
        Self {
            drop_to_gap: true,
            drop_position: -1,
            ..Self::onto(drag_key, drop_key)
        }
    }

    pub fn below(drag_key: impl Into<String>, drop_key: impl Into<String>) -> Self {
        Self {
            drop_to_gap: true,
            drop_position: 1,
            ..Self::onto(drag_key, drop_key)
        }
    }
}

/// Where the dragged node ends up relative to the drop node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPlacement {
    /// First child of the drop node; `expand` forces the drop node open.
    Inside { expand: bool },
    Before,
    After,
}

pub fn resolve_drop(
    tree: &[TreeNode],
    expansion: &ExpansionState,
    event: &DropEvent,
) -> Result<DropPlacement, TreeError> {
    let target = find_by_key(tree, &event.drop_key)
        .ok_or_else(|| TreeError::TargetNotFound(event.drop_key.clone()))?;

    if !event.drop_to_gap {
        return Ok(DropPlacement::Inside { expand: true });
    }

    // Bottom edge of an open folder reads as "first child", the row
    // underneath it is already one of its children.
    let open_folder = target.has_children() && expansion.is_expanded(&target.key);
    if open_folder && event.drop_position == 1 {
        return Ok(DropPlacement::Inside { expand: false });
    }

    Ok(if event.drop_position == -1 {
        DropPlacement::Before
    } else {
        DropPlacement::After
    })
}
