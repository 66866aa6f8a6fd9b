//! Search-driven expansion and highlight projection.
//!
//! Matching is a plain case-sensitive substring test on `title`, first
//! occurrence only.

use indexmap::IndexSet;
use serde::Serialize;

use crate::core::{expansion::ExpansionState, node::TreeNode, store::Forest};

/// Ancestor keys that must be expanded for every title match to be visible.
/// An empty query yields an empty set.
pub fn expand_paths_for_query(tree: &[TreeNode], query: &str) -> IndexSet<String> {
    fn walk<'a>(
        nodes: &'a [TreeNode],
        query: &str,
        path: &mut Vec<&'a str>,
        out: &mut IndexSet<String>,
    ) {
        for node in nodes {
            if node.title.contains(query) {
                out.extend(path.iter().map(|k| k.to_string()));
            }
            path.push(&node.key);
            walk(&node.children, query, path, out);
            path.pop();
        }
    }

    let mut out = IndexSet::new();
    if !query.is_empty() {
        walk(tree, query, &mut Vec::new(), &mut out);
    }
    out
}

/// Updates `state` for a new query. An empty query leaves it untouched
/// rather than collapsing everything.
pub fn apply_to_expansion(state: &mut ExpansionState, tree: &[TreeNode], query: &str) {
    if query.is_empty() {
        return;
    }
    state.reveal(expand_paths_for_query(tree, query));
}

/// Display title split around the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TitleView {
    Plain { text: String },
    Highlighted {
        before: String,
        matched: String,
        after: String,
    },
}

impl TitleView {
    fn for_title(title: &str, query: &str) -> Self {
        match title.find(query).filter(|_| !query.is_empty()) {
            Some(start) => {
                let end = start + query.len();
                TitleView::Highlighted {
                    before: title[..start].to_string(),
                    matched: title[start..end].to_string(),
                    after: title[end..].to_string(),
                }
            }
            None => TitleView::Plain {
                text: title.to_string(),
            },
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, TitleView::Highlighted { .. })
    }

    /// The full title text, markers dropped.
    pub fn text(&self) -> String {
        match self {
            TitleView::Plain { text } => text.clone(),
            TitleView::Highlighted {
                before,
                matched,
                after,
            } => format!("{before}{matched}{after}"),
        }
    }
}

/// Read-only mirror of a node for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedNode {
    pub key: String,
    pub title: TitleView,
    pub is_leaf: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DecoratedNode>,
}

pub fn decorate(tree: &[TreeNode], query: &str) -> Vec<DecoratedNode> {
    tree.iter()
        .map(|node| DecoratedNode {
            key: node.key.clone(),
            title: TitleView::for_title(&node.title, query),
            is_leaf: node.is_leaf,
            children: decorate(&node.children, query),
        })
        .collect()
}

/// Keeps matching nodes (with their whole subtree) and the ancestors leading
/// to them.
pub fn filter(tree: &[TreeNode], query: &str) -> Forest {
    if query.is_empty() {
        return tree.to_vec();
    }
    tree.iter()
        .filter_map(|node| {
            if node.title.contains(query) {
                return Some(node.clone());
            }
            let children = filter(&node.children, query);
            (!children.is_empty()).then(|| TreeNode {
                children,
                ..node.clone()
            })
        })
        .collect()
}

/// One title match with the keys leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub key: String,
    pub title: String,
    pub ancestors: Vec<String>,
}

/// Matches in pre-order.
pub fn find_matches(tree: &[TreeNode], query: &str) -> Vec<SearchHit> {
    fn walk(nodes: &[TreeNode], query: &str, path: &mut Vec<String>, out: &mut Vec<SearchHit>) {
        for node in nodes {
            if node.title.contains(query) {
                out.push(SearchHit {
                    key: node.key.clone(),
                    title: node.title.clone(),
                    ancestors: path.clone(),
                });
            }
            path.push(node.key.clone());
            walk(&node.children, query, path, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    if !query.is_empty() {
        walk(tree, query, &mut Vec::new(), &mut out);
    }
    out
}

pub fn match_count(tree: &[TreeNode], query: &str) -> usize {
    if query.is_empty() {
        return 0;
    }
    tree.iter()
        .map(|n| usize::from(n.title.contains(query)) + match_count(&n.children, query))
        .sum()
}
