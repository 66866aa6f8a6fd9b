//! Shared test utilities for integration tests
//!
//! Provides fixture trees, catalog items and a random forest builder used
//! across multiple test files.

#![allow(dead_code)]

use cattree::core::{Forest, PendingItem, TreeNode};

/// Electronics catalog with `Resistors` three levels deep.
pub fn catalog_tree() -> Forest
{
    vec![
        TreeNode::folder(
            "elec",
            "Electronics",
            vec![
                TreeNode::folder(
                    "pass",
                    "Passives",
                    vec![TreeNode::folder(
                        "fixed",
                        "Fixed",
                        vec![TreeNode::leaf("res", "Resistors").with_code("RES")],
                    )],
                ),
                TreeNode::folder(
                    "semi",
                    "Semiconductors",
                    vec![TreeNode::leaf("diode", "Diodes"), TreeNode::leaf("tvs", "TVS Diodes")],
                ),
            ],
        ),
        TreeNode::leaf("mech", "Mechanical"),
    ]
}

/// The R / A seed from the end-to-end scenario.
pub fn r_a_seed() -> Forest
{
    vec![TreeNode::folder("R", "R", vec![TreeNode::leaf("A", "A")])]
}

pub fn pending(keys: &[&str]) -> Vec<PendingItem>
{
    keys.iter()
        .map(|k| PendingItem::new(*k, format!("Item {k}")))
        .collect()
}

/// Builds a forest from a parent list: `parents[i]` is the index of node
/// `i`'s parent (always `< i`) or `None` for a root. Keys are `n{i}`.
pub fn forest_from_parents(parents: &[Option<usize>]) -> Forest
{
    fn build(
        index: usize,
        parents: &[Option<usize>],
    ) -> TreeNode
    {
        let children: Vec<TreeNode> = (0..parents.len())
            .filter(|&j| parents[j] == Some(index))
            .map(|j| build(j, parents))
            .collect();
        let title = format!("Node {index}");
        if children.is_empty()
        {
            TreeNode::leaf(format!("n{index}"), title)
        }
        else
        {
            TreeNode::folder(format!("n{index}"), title, children)
        }
    }

    (0..parents.len())
        .filter(|&i| parents[i].is_none())
        .map(|i| build(i, parents))
        .collect()
}

/// Sorted key list, for multiset comparisons.
pub fn sorted_keys(tree: &[TreeNode]) -> Vec<String>
{
    let mut keys = cattree::core::store::collect_all_keys(tree);
    keys.sort();
    keys
}
