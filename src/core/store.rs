//! Structural operations over the category forest.
//!
//! Every public operation takes the forest by shared reference and returns a
//! fresh copy; the caller's tree is never touched. Operations come in two
//! flavors:
//! - `try_*` returns `Result<Forest, TreeError>` so callers can see anomalies.
//! - the plain form logs the anomaly at debug level and hands back an
//!   unchanged copy, which is how stale selections are tolerated.
//!
//! [`TreeStore`] owns the single published tree and guards async subtree
//! loads against wholesale replacement.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::node::TreeNode;

/// An ordered sequence of root nodes.
pub type Forest = Vec<TreeNode>;

/// Structural anomalies. None of these are fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    TargetNotFound(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("cannot move {dragged} into its own subtree at {target}")]
    CyclicMove { dragged: String, target: String },
    #[error("sibling index {index} out of range for {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("node {0} is marked leaf but has children")]
    LeafWithChildren(String),
    #[error("stale load for {key}: tree was replaced")]
    StaleLoad { key: String },
}

/// Which edge of a children sequence receives inserted nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Prepend,
    #[default]
    Append,
}

/// Placement relative to an existing sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingSide {
    Before,
    After,
}

// ------------------------------------------------------------------
// Read-only queries
// ------------------------------------------------------------------

/// Deep-copies the structure; payloads are shared.
pub fn clone_forest(tree: &[TreeNode]) -> Forest {
    tree.iter().map(TreeNode::clone).collect()
}

/// Depth-first search, first match wins.
pub fn find_by_key<'a>(tree: &'a [TreeNode], key: &str) -> Option<&'a TreeNode> {
    for node in tree {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find_by_key(&node.children, key) {
            return Some(found);
        }
    }
    None
}

pub fn contains_key(tree: &[TreeNode], key: &str) -> bool {
    find_by_key(tree, key).is_some()
}

/// Pre-order key listing, used to seed "expand all".
pub fn collect_all_keys(tree: &[TreeNode]) -> Vec<String> {
    fn walk(nodes: &[TreeNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.key.clone());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

pub fn count_nodes(tree: &[TreeNode]) -> usize {
    tree.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

/// Keys of every ancestor of `key`, root first. `None` if `key` is absent.
pub fn ancestors_of(tree: &[TreeNode], key: &str) -> Option<Vec<String>> {
    fn walk(nodes: &[TreeNode], key: &str, path: &mut Vec<String>) -> bool {
        for node in nodes {
            if node.key == key {
                return true;
            }
            path.push(node.key.clone());
            if walk(&node.children, key, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(tree, key, &mut path).then_some(path)
}

pub fn parent_key_of(tree: &[TreeNode], key: &str) -> Option<String> {
    ancestors_of(tree, key).and_then(|mut path| path.pop())
}

/// Parent key (`None` for roots) and index within the parent's children.
pub fn position_of(tree: &[TreeNode], key: &str) -> Option<(Option<String>, usize)> {
    fn walk(
        nodes: &[TreeNode],
        parent: Option<&str>,
        key: &str,
    ) -> Option<(Option<String>, usize)> {
        if let Some(index) = nodes.iter().position(|n| n.key == key) {
            return Some((parent.map(str::to_string), index));
        }
        nodes
            .iter()
            .find_map(|n| walk(&n.children, Some(&n.key), key))
    }

    walk(tree, None, key)
}

/// Checks key uniqueness and that no node with children is marked leaf.
pub fn validate(tree: &[TreeNode]) -> Result<(), TreeError> {
    fn walk<'a>(nodes: &'a [TreeNode], seen: &mut HashSet<&'a str>) -> Result<(), TreeError> {
        for node in nodes {
            if !seen.insert(node.key.as_str()) {
                return Err(TreeError::DuplicateKey(node.key.clone()));
            }
            if node.is_leaf && node.has_children() {
                return Err(TreeError::LeafWithChildren(node.key.clone()));
            }
            walk(&node.children, seen)?;
        }
        Ok(())
    }

    walk(tree, &mut HashSet::new())
}

// ------------------------------------------------------------------
// In-place primitives, only ever applied to a private clone
// ------------------------------------------------------------------

pub(crate) fn find_by_key_mut<'a>(tree: &'a mut [TreeNode], key: &str) -> Option<&'a mut TreeNode> {
    for node in tree.iter_mut() {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find_by_key_mut(&mut node.children, key) {
            return Some(found);
        }
    }
    None
}

/// The children sequence holding `key`, plus the index of `key` in it.
pub(crate) fn siblings_of_mut<'a>(
    nodes: &'a mut Vec<TreeNode>,
    key: &str,
) -> Option<(&'a mut Vec<TreeNode>, usize)> {
    if let Some(index) = nodes.iter().position(|n| n.key == key) {
        return Some((nodes, index));
    }
    for node in nodes.iter_mut() {
        if let Some(hit) = siblings_of_mut(&mut node.children, key) {
            return Some(hit);
        }
    }
    None
}

/// Removes the node wherever it sits. The former parent keeps `is_leaf`
/// as it was, so an emptied folder stays a folder.
pub(crate) fn detach(nodes: &mut Vec<TreeNode>, key: &str) -> Option<TreeNode> {
    let (siblings, index) = siblings_of_mut(nodes, key)?;
    Some(siblings.remove(index))
}

pub(crate) fn insert_into(target: &mut TreeNode, nodes: Vec<TreeNode>, position: InsertPosition) {
    match position {
        InsertPosition::Prepend => {
            target.children.splice(0..0, nodes);
        }
        InsertPosition::Append => target.children.extend(nodes),
    }
    target.is_leaf = false;
}

fn or_unchanged(tree: &[TreeNode], op: &'static str, result: Result<Forest, TreeError>) -> Forest {
    result.unwrap_or_else(|err| {
        debug!(op, %err, "tree left unchanged");
        clone_forest(tree)
    })
}

// ------------------------------------------------------------------
// Copy-on-write mutations
// ------------------------------------------------------------------

pub fn try_update_children(
    tree: &[TreeNode],
    parent_key: &str,
    new_children: Vec<TreeNode>,
) -> Result<Forest, TreeError> {
    let mut next = clone_forest(tree);
    let parent = find_by_key_mut(&mut next, parent_key)
        .ok_or_else(|| TreeError::TargetNotFound(parent_key.to_string()))?;

    if !new_children.is_empty() {
        parent.is_leaf = false;
    }
    parent.children = new_children;
    Ok(next)
}

/// Replaces the children of `parent_key`, clearing `is_leaf` when the new
/// sequence is non-empty.
pub fn update_children(tree: &[TreeNode], parent_key: &str, new_children: Vec<TreeNode>) -> Forest {
    or_unchanged(
        tree,
        "update_children",
        try_update_children(tree, parent_key, new_children),
    )
}

pub fn try_insert_children(
    tree: &[TreeNode],
    target_key: &str,
    nodes: Vec<TreeNode>,
    position: InsertPosition,
) -> Result<Forest, TreeError> {
    let mut next = clone_forest(tree);
    let target = find_by_key_mut(&mut next, target_key)
        .ok_or_else(|| TreeError::TargetNotFound(target_key.to_string()))?;
    insert_into(target, nodes, position);
    Ok(next)
}

/// Inserts `nodes` at one edge of the target's children. The target becomes
/// a folder even when `nodes` is empty.
#[instrument(level = "debug", skip(tree, nodes), fields(count = nodes.len()))]
pub fn insert_children(
    tree: &[TreeNode],
    target_key: &str,
    nodes: Vec<TreeNode>,
    position: InsertPosition,
) -> Forest {
    or_unchanged(
        tree,
        "insert_children",
        try_insert_children(tree, target_key, nodes, position),
    )
}

pub fn try_remove_by_key(tree: &[TreeNode], key: &str) -> Result<(Forest, TreeNode), TreeError> {
    let mut next = clone_forest(tree);
    let removed = detach(&mut next, key).ok_or_else(|| TreeError::TargetNotFound(key.to_string()))?;
    Ok((next, removed))
}

/// Detaches `key` and returns it for re-insertion.
pub fn remove_by_key(tree: &[TreeNode], key: &str) -> (Forest, Option<TreeNode>) {
    match try_remove_by_key(tree, key) {
        Ok((next, removed)) => (next, Some(removed)),
        Err(err) => {
            debug!(op = "remove_by_key", %err, "tree left unchanged");
            (clone_forest(tree), None)
        }
    }
}

pub fn try_reorder_siblings(
    tree: &[TreeNode],
    parent_key: Option<&str>,
    from: usize,
    to: usize,
) -> Result<Forest, TreeError> {
    let mut next = clone_forest(tree);
    let siblings = match parent_key {
        None => &mut next,
        Some(key) => {
            &mut find_by_key_mut(&mut next, key)
                .ok_or_else(|| TreeError::TargetNotFound(key.to_string()))?
                .children
        }
    };

    let len = siblings.len();
    for index in [from, to] {
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
    }

    let node = siblings.remove(from);
    siblings.insert(to, node);
    Ok(next)
}

/// Moves a node within one children sequence. `None` addresses the roots.
/// `to` is the node's index after the move.
pub fn reorder_siblings(
    tree: &[TreeNode],
    parent_key: Option<&str>,
    from: usize,
    to: usize,
) -> Forest {
    or_unchanged(
        tree,
        "reorder_siblings",
        try_reorder_siblings(tree, parent_key, from, to),
    )
}

pub fn try_insert_sibling(
    tree: &[TreeNode],
    anchor_key: &str,
    node: TreeNode,
    side: SiblingSide,
) -> Result<Forest, TreeError> {
    let mut next = clone_forest(tree);
    let (siblings, index) = siblings_of_mut(&mut next, anchor_key)
        .ok_or_else(|| TreeError::TargetNotFound(anchor_key.to_string()))?;
    let at = match side {
        SiblingSide::Before => index,
        SiblingSide::After => index + 1,
    };
    siblings.insert(at, node);
    Ok(next)
}

pub fn insert_sibling(
    tree: &[TreeNode],
    anchor_key: &str,
    node: TreeNode,
    side: SiblingSide,
) -> Forest {
    or_unchanged(
        tree,
        "insert_sibling",
        try_insert_sibling(tree, anchor_key, node, side),
    )
}

// ------------------------------------------------------------------
// Published tree
// ------------------------------------------------------------------

/// Handle for an in-flight subtree fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub key: String,
    generation: u64,
}

/// Owner of the one current tree.
///
/// Mutations go through [`TreeStore::apply`], which publishes the new forest
/// only when the closure succeeds. [`TreeStore::replace`] swaps the whole tree
/// and invalidates outstanding [`LoadTicket`]s.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    current: Forest,
    generation: u64,
}

impl TreeStore {
    pub fn new(seed: Forest) -> Self {
        Self {
            current: seed,
            generation: 0,
        }
    }

    pub fn current(&self) -> &[TreeNode] {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, forest: Forest) {
        self.current = forest;
        self.generation += 1;
    }

    /// Publishes an edited version of the current tree. Unlike
    /// [`TreeStore::replace`] this keeps outstanding load tickets valid.
    pub fn publish(&mut self, forest: Forest) {
        self.current = forest;
    }

    pub fn apply<F>(&mut self, mutate: F) -> Result<(), TreeError>
    where
        F: FnOnce(&[TreeNode]) -> Result<Forest, TreeError>,
    {
        let next = mutate(&self.current)?;
        self.current = next;
        Ok(())
    }

    pub fn begin_load(&self, key: impl Into<String>) -> LoadTicket {
        LoadTicket {
            key: key.into(),
            generation: self.generation,
        }
    }

    /// Applies a fetched subtree if the tree has not been replaced since the
    /// ticket was issued and the node still exists. A subtree that would
    /// repeat a key already in the forest is dropped whole.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        children: Vec<TreeNode>,
    ) -> Result<(), TreeError> {
        if ticket.generation != self.generation {
            debug!(key = %ticket.key, "discarding load for replaced tree");
            return Err(TreeError::StaleLoad {
                key: ticket.key.clone(),
            });
        }
        self.apply(|tree| {
            let next = try_update_children(tree, &ticket.key, children)?;
            validate(&next)?;
            Ok(next)
        })
        .inspect_err(|err| debug!(%err, "discarding load"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        vec![
            TreeNode::folder(
                "R",
                "Root",
                vec![
                    TreeNode::leaf("A", "Alpha"),
                    TreeNode::folder("B", "Beta", vec![TreeNode::leaf("B1", "Beta one")]),
                    TreeNode::leaf("C", "Gamma"),
                ],
            ),
            TreeNode::leaf("S", "Second root"),
        ]
    }

    fn child_keys(tree: &[TreeNode], key: &str) -> Vec<String> {
        find_by_key(tree, key)
            .unwrap()
            .children
            .iter()
            .map(|n| n.key.clone())
            .collect()
    }

    #[test]
    fn test_collect_all_keys_is_preorder() {
        assert_eq!(collect_all_keys(&sample()), ["R", "A", "B", "B1", "C", "S"]);
    }

    #[test]
    fn test_insert_prepend_and_append() {
        let tree = sample();
        let z = vec![TreeNode::leaf("Z", "Zeta")];
        let tree = insert_children(&tree, "R", z, InsertPosition::Prepend);
        let y = vec![TreeNode::leaf("Y", "Ypsilon")];
        let tree = insert_children(&tree, "R", y, InsertPosition::Append);
        assert_eq!(child_keys(&tree, "R"), ["Z", "A", "B", "C", "Y"]);
    }

    #[test]
    fn test_insert_empty_still_marks_folder() {
        let tree = insert_children(&sample(), "A", Vec::new(), InsertPosition::Append);
        let a = find_by_key(&tree, "A").unwrap();
        assert!(!a.is_leaf);
        assert!(a.children.is_empty());
    }

    #[test]
    fn test_insert_missing_target_is_noop() {
        let tree = sample();
        let err = try_insert_children(&tree, "nope", vec![], InsertPosition::Append).unwrap_err();
        assert_eq!(err, TreeError::TargetNotFound("nope".into()));
        assert_eq!(insert_children(&tree, "nope", vec![], InsertPosition::Append), tree);
    }

    #[test]
    fn test_update_children_clears_leaf_only_when_non_empty() {
        let tree = update_children(&sample(), "A", Vec::new());
        assert!(find_by_key(&tree, "A").unwrap().is_leaf);

        let tree = update_children(&tree, "A", vec![TreeNode::leaf("A1", "Alpha one")]);
        assert!(!find_by_key(&tree, "A").unwrap().is_leaf);
        assert_eq!(child_keys(&tree, "A"), ["A1"]);
    }

    #[test]
    fn test_remove_returns_detached_subtree() {
        let (tree, removed) = remove_by_key(&sample(), "B");
        let removed = removed.unwrap();
        assert_eq!(removed.children[0].key, "B1");
        assert!(!contains_key(&tree, "B"));
        assert!(!contains_key(&tree, "B1"));
        assert_eq!(count_nodes(&tree), 4);
    }

    #[test]
    fn test_remove_last_child_keeps_folder() {
        let (tree, _) = remove_by_key(&sample(), "B1");
        let b = find_by_key(&tree, "B").unwrap();
        assert!(b.children.is_empty());
        assert!(!b.is_leaf);
    }

    #[test]
    fn test_reorder_siblings() {
        let tree = reorder_siblings(&sample(), Some("R"), 0, 2);
        assert_eq!(child_keys(&tree, "R"), ["B", "C", "A"]);

        let roots = reorder_siblings(&tree, None, 1, 0);
        assert_eq!(roots[0].key, "S");
    }

    #[test]
    fn test_reorder_out_of_range() {
        let err = try_reorder_siblings(&sample(), Some("R"), 0, 3).unwrap_err();
        assert_eq!(err, TreeError::IndexOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_insert_sibling_sides() {
        let tree = insert_sibling(&sample(), "B", TreeNode::leaf("X", "X"), SiblingSide::Before);
        let tree = insert_sibling(&tree, "B", TreeNode::leaf("Y", "Y"), SiblingSide::After);
        assert_eq!(child_keys(&tree, "R"), ["A", "X", "B", "Y", "C"]);
    }

    #[test]
    fn test_ancestors_and_position() {
        let tree = sample();
        assert_eq!(ancestors_of(&tree, "B1").unwrap(), ["R", "B"]);
        assert_eq!(ancestors_of(&tree, "R").unwrap(), Vec::<String>::new());
        assert!(ancestors_of(&tree, "missing").is_none());
        assert_eq!(parent_key_of(&tree, "C").as_deref(), Some("R"));
        assert_eq!(position_of(&tree, "C"), Some((Some("R".into()), 2)));
        assert_eq!(position_of(&tree, "S"), Some((None, 1)));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_leaf_folders() {
        assert!(validate(&sample()).is_ok());

        let mut dup = sample();
        dup.push(TreeNode::leaf("B1", "again"));
        assert_eq!(validate(&dup), Err(TreeError::DuplicateKey("B1".into())));

        let mut bad = sample();
        bad[0].is_leaf = true;
        assert_eq!(validate(&bad), Err(TreeError::LeafWithChildren("R".into())));
    }

    #[test]
    fn test_store_apply_is_all_or_nothing() {
        let mut store = TreeStore::new(sample());
        let before = store.current().to_vec();

        let result = store.apply(|t| {
            let (t, node) = try_remove_by_key(t, "A")?;
            try_insert_children(&t, "missing", vec![node], InsertPosition::Append)
        });

        assert!(result.is_err());
        assert_eq!(store.current(), before.as_slice());
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut store = TreeStore::new(sample());
        let ticket = store.begin_load("B");

        store.replace(sample());
        let err = store
            .complete_load(&ticket, vec![TreeNode::leaf("B2", "late")])
            .unwrap_err();
        assert_eq!(err, TreeError::StaleLoad { key: "B".into() });
        assert!(!contains_key(store.current(), "B2"));

        let fresh = store.begin_load("B");
        store
            .complete_load(&fresh, vec![TreeNode::leaf("B2", "on time")])
            .unwrap();
        assert_eq!(child_keys(store.current(), "B"), ["B2"]);
    }

    #[test]
    fn test_load_repeating_existing_key_is_discarded() {
        let mut store = TreeStore::new(sample());
        let before = store.current().to_vec();
        let ticket = store.begin_load("B");

        let err = store
            .complete_load(&ticket, vec![TreeNode::leaf("A", "Alpha again")])
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateKey("A".into()));
        assert_eq!(store.current(), before.as_slice());
        assert!(validate(store.current()).is_ok());

        // Reloading a node's own children is not a duplicate.
        store
            .complete_load(&ticket, vec![TreeNode::leaf("B1", "Beta one, refreshed")])
            .unwrap();
        assert_eq!(child_keys(store.current(), "B"), ["B1"]);
    }
}
