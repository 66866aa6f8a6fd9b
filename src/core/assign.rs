//! Assignment of pending items into the category tree.
//!
//! The free functions [`assign`] and [`drag_move`] are pure: they read a tree
//! and return a new one. [`AssignmentController`] owns a whole editing session
//! (tree, pending items, selection, expansion, draft slot) and keeps those
//! pieces consistent after every structural change.

use std::collections::HashSet;

use indexmap::IndexSet;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::core::{
    draft::{self, DEFAULT_DRAFT_KEY, DraftSnapshot, DraftStore, MemoryDraftStore},
    drop::{DropEvent, DropPlacement, resolve_drop},
    expansion::ExpansionState,
    node::TreeNode,
    pending::{PendingItem, keys_of},
    search,
    selection::{Modifiers, SelectionState},
    store::{
        self, Forest, InsertPosition, LoadTicket, TreeError, TreeStore, ancestors_of, clone_forest,
        contains_key, detach, find_by_key_mut, insert_into, siblings_of_mut,
    },
};

/// What to do when an assigned key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Refuse the whole batch.
    #[default]
    Reject,
    /// Insert anyway; the tree may then hold the key twice.
    Allow,
}

/// Validation failures surfaced to the user. Nothing is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    #[error("select at least one pending item first")]
    EmptySelection,
    #[error("choose a target category first")]
    NoTarget,
    #[error("key already present in the tree: {0}")]
    DuplicateKey(String),
}

/// Raised when finalizing with items still unassigned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("{} pending item(s) not assigned; confirm to discard them", .remaining.len())]
    IncompleteSubmission { remaining: Vec<PendingItem> },
}

/// Result of a pure assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub tree: Forest,
    pub remaining: Vec<PendingItem>,
    /// Empty when the target no longer exists.
    pub assigned: Vec<String>,
}

/// Places the selected pending items as leaves at the end of `target`'s
/// children.
///
/// A target that is missing from the tree is a stale selection: the tree and
/// pending list come back unchanged and `assigned` is empty.
pub fn assign(
    tree: &[TreeNode],
    pending: &[PendingItem],
    selected: &IndexSet<String>,
    target: Option<&str>,
    policy: DuplicatePolicy,
) -> Result<Assignment, AssignError> {
    if selected.is_empty() {
        return Err(AssignError::EmptySelection);
    }
    let target = target.ok_or(AssignError::NoTarget)?;

    let (chosen, remaining): (Vec<&PendingItem>, Vec<&PendingItem>) =
        pending.iter().partition(|item| selected.contains(&item.key));

    if chosen.is_empty() {
        return Err(AssignError::EmptySelection);
    }

    if policy == DuplicatePolicy::Reject {
        let mut batch = HashSet::new();
        for item in &chosen {
            if !batch.insert(item.key.as_str()) || contains_key(tree, &item.key) {
                return Err(AssignError::DuplicateKey(item.key.clone()));
            }
        }
    }

    let nodes = chosen.iter().map(|item| item.to_node()).collect();
    match store::try_insert_children(tree, target, nodes, InsertPosition::Append) {
        Ok(tree) => Ok(Assignment {
            tree,
            remaining: remaining.into_iter().cloned().collect(),
            assigned: chosen.iter().map(|item| item.key.clone()).collect(),
        }),
        Err(err) => {
            debug!(%err, "assignment target vanished");
            Ok(Assignment {
                tree: clone_forest(tree),
                remaining: pending.to_vec(),
                assigned: Vec::new(),
            })
        }
    }
}

/// Result of a drag-and-drop move.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub tree: Forest,
    /// Drop node to open after the move, if the drop forces it.
    pub expand: Option<String>,
}

/// Moves `drag_key` according to the drop event.
///
/// Detach and insert happen on one cloned snapshot, so a failed move leaves
/// nothing behind and a successful one never duplicates the node.
#[instrument(level = "debug", skip(tree, expansion))]
pub fn drag_move(
    tree: &[TreeNode],
    expansion: &ExpansionState,
    event: &DropEvent,
) -> Result<DragOutcome, TreeError> {
    let drop_ancestors = ancestors_of(tree, &event.drop_key)
        .ok_or_else(|| TreeError::TargetNotFound(event.drop_key.clone()))?;
    if !contains_key(tree, &event.drag_key) {
        return Err(TreeError::TargetNotFound(event.drag_key.clone()));
    }
    if event.drag_key == event.drop_key || drop_ancestors.contains(&event.drag_key) {
        return Err(TreeError::CyclicMove {
            dragged: event.drag_key.clone(),
            target: event.drop_key.clone(),
        });
    }

    let placement = resolve_drop(tree, expansion, event)?;

    let mut next = clone_forest(tree);
    let dragged = detach(&mut next, &event.drag_key)
        .ok_or_else(|| TreeError::TargetNotFound(event.drag_key.clone()))?;

    let mut expand = None;
    match placement {
        DropPlacement::Inside { expand: force } => {
            let target = find_by_key_mut(&mut next, &event.drop_key)
                .ok_or_else(|| TreeError::TargetNotFound(event.drop_key.clone()))?;
            insert_into(target, vec![dragged], InsertPosition::Prepend);
            if force {
                expand = Some(event.drop_key.clone());
            }
        }
        DropPlacement::Before | DropPlacement::After => {
            let (siblings, index) = siblings_of_mut(&mut next, &event.drop_key)
                .ok_or_else(|| TreeError::TargetNotFound(event.drop_key.clone()))?;
            let at = if placement == DropPlacement::Before {
                index
            } else {
                index + 1
            };
            siblings.insert(at, dragged);
        }
    }

    Ok(DragOutcome { tree: next, expand })
}

/// Summary of a successful [`AssignmentController::assign_selected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignReport {
    pub target: String,
    pub assigned: Vec<String>,
    pub remaining: usize,
}

/// What [`AssignmentController::finalize`] hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub tree: Forest,
    pub discarded: Vec<PendingItem>,
}

/// Everything the view needs to render one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<'a> {
    pub tree: &'a [TreeNode],
    pub expansion: &'a ExpansionState,
    pub selection: &'a SelectionState,
    pub pending: &'a [PendingItem],
    pub target: Option<&'a str>,
}

/// Session knobs, usually built from [`crate::infra::Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub draft_key: String,
    pub duplicate_policy: DuplicatePolicy,
    pub expand_all_on_load: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
            duplicate_policy: DuplicatePolicy::Reject,
            expand_all_on_load: true,
        }
    }
}

/// One category-assignment editing session.
#[derive(Debug)]
pub struct AssignmentController {
    seed: Forest,
    store: TreeStore,
    pending: Vec<PendingItem>,
    selection: SelectionState,
    expansion: ExpansionState,
    target: Option<String>,
    drafts: Box<dyn DraftStore>,
    options: SessionOptions,
}

impl AssignmentController {
    pub fn new(seed: Forest) -> Self {
        Self::with_options(seed, SessionOptions::default(), Box::new(MemoryDraftStore::new()))
    }

    pub fn with_options(
        seed: Forest,
        options: SessionOptions,
        drafts: Box<dyn DraftStore>,
    ) -> Self {
        let mut expansion = ExpansionState::new();
        if options.expand_all_on_load {
            expansion.expand_all(store::collect_all_keys(&seed));
        }
        Self {
            store: TreeStore::new(seed.clone()),
            seed,
            pending: Vec::new(),
            selection: SelectionState::new(),
            expansion,
            target: None,
            drafts,
            options,
        }
    }

    pub fn tree(&self) -> &[TreeNode] {
        self.store.current()
    }

    pub fn pending(&self) -> &[PendingItem] {
        &self.pending
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn drafts(&self) -> &dyn DraftStore {
        self.drafts.as_ref()
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            tree: self.store.current(),
            expansion: &self.expansion,
            selection: &self.selection,
            pending: &self.pending,
            target: self.target.as_deref(),
        }
    }

    /// Replaces the tree wholesale, e.g. after an external reload.
    /// Outstanding subtree loads become stale.
    pub fn load_tree(&mut self, forest: Forest) {
        self.expansion.clear();
        if self.options.expand_all_on_load {
            self.expansion.expand_all(store::collect_all_keys(&forest));
        }
        if self.target.as_deref().is_some_and(|t| !contains_key(&forest, t)) {
            self.target = None;
        }
        self.store.replace(forest);
    }

    pub fn begin_load(&self, key: impl Into<String>) -> LoadTicket {
        self.store.begin_load(key)
    }

    /// Applies a lazily fetched subtree unless it went stale.
    pub fn complete_load(&mut self, ticket: &LoadTicket, children: Vec<TreeNode>) -> bool {
        self.store.complete_load(ticket, children).is_ok()
    }

    // --------------------------------------------------------------
    // Pending collection
    // --------------------------------------------------------------

    /// Starts the assignment stage with a fresh collection.
    pub fn enter_assignment(&mut self, items: Vec<PendingItem>) {
        self.pending = items;
        self.selection.reset();
        self.persist();
    }

    /// Adds catalog picks, skipping keys that are already pending.
    pub fn add_pending(&mut self, items: Vec<PendingItem>) -> usize {
        let before = self.pending.len();
        for item in items {
            if self.pending.iter().any(|p| p.key == item.key) {
                debug!(key = %item.key, "already pending");
                continue;
            }
            self.pending.push(item);
        }
        let added = self.pending.len() - before;
        if added > 0 {
            self.persist();
        }
        added
    }

    pub fn remove_pending<'a, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys: HashSet<&str> = keys.into_iter().collect();
        let before = self.pending.len();
        self.pending.retain(|p| !keys.contains(p.key.as_str()));
        self.selection.remove_keys(keys.iter().copied());
        let removed = before - self.pending.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Offers the saved draft back. Returns false when there is none.
    pub fn restore_draft(&mut self) -> bool {
        match draft::load_draft(self.drafts.as_ref(), &self.options.draft_key) {
            Some(DraftSnapshot { items, saved_at }) => {
                info!(%saved_at, items = items.len(), "restoring draft");
                self.pending = items;
                self.selection.reset();
                true
            }
            None => false,
        }
    }

    // --------------------------------------------------------------
    // Selection and targeting
    // --------------------------------------------------------------

    pub fn click(&mut self, key: &str, modifiers: Modifiers) {
        let order = keys_of(&self.pending);
        self.selection.click(key, modifiers, &order);
    }

    pub fn toggle_checkbox(&mut self, key: &str) {
        self.selection.toggle_checkbox(key);
    }

    pub fn select_all(&mut self) {
        let order = keys_of(&self.pending);
        self.selection.select_all(&order);
    }

    pub fn set_target(&mut self, key: Option<String>) {
        self.target = key;
    }

    /// Reveals matches for `query` and returns how many titles matched.
    pub fn search(&mut self, query: &str) -> usize {
        search::apply_to_expansion(&mut self.expansion, self.store.current(), query);
        search::match_count(self.store.current(), query)
    }

    // --------------------------------------------------------------
    // Structural changes
    // --------------------------------------------------------------

    /// Moves the selected pending items under the current target.
    #[instrument(
        level = "debug",
        skip(self),
        fields(target = ?self.target, selected = self.selection.len())
    )]
    pub fn assign_selected(&mut self) -> Result<AssignReport, AssignError> {
        let outcome = assign(
            self.store.current(),
            &self.pending,
            self.selection.selected(),
            self.target.as_deref(),
            self.options.duplicate_policy,
        )
        .inspect_err(|err| warn!(%err, "assignment rejected"))?;

        // validated above
        let target = self.target.clone().unwrap_or_default();
        if outcome.assigned.is_empty() {
            return Ok(AssignReport {
                target,
                assigned: Vec::new(),
                remaining: self.pending.len(),
            });
        }

        self.store.publish(outcome.tree);
        self.pending = outcome.remaining;
        self.expansion.expand(target.clone());
        self.selection.reset();
        self.persist();

        info!(
            target = %target,
            assigned = %outcome.assigned.iter().join(","),
            "assigned pending items"
        );
        Ok(AssignReport {
            target,
            assigned: outcome.assigned,
            remaining: self.pending.len(),
        })
    }

    /// Applies a drag-and-drop move. On error nothing changes.
    pub fn drag(&mut self, event: &DropEvent) -> Result<(), TreeError> {
        let outcome = drag_move(self.store.current(), &self.expansion, event)
            .inspect_err(|err| debug!(%err, "drop ignored"))?;
        self.store.publish(outcome.tree);
        if let Some(key) = outcome.expand {
            self.expansion.expand(key);
        }
        Ok(())
    }

    /// Same-level reorder without reparenting.
    pub fn reorder(
        &mut self,
        parent_key: Option<&str>,
        from: usize,
        to: usize,
    ) -> Result<(), TreeError> {
        self.store
            .apply(|tree| store::try_reorder_siblings(tree, parent_key, from, to))
    }

    /// Hands the tree off. Unassigned items block unless `confirm_discard`.
    pub fn finalize(&mut self, confirm_discard: bool) -> Result<Submission, SubmitError> {
        if !self.pending.is_empty() && !confirm_discard {
            return Err(SubmitError::IncompleteSubmission {
                remaining: self.pending.clone(),
            });
        }

        let discarded = std::mem::take(&mut self.pending);
        if !discarded.is_empty() {
            warn!(count = discarded.len(), "discarding unassigned items on submit");
        }
        self.selection.reset();
        self.clear_draft();

        Ok(Submission {
            tree: self.store.current().to_vec(),
            discarded,
        })
    }

    /// Throws the session away and goes back to the seed tree.
    pub fn cancel(&mut self) {
        let seed = self.seed.clone();
        self.pending.clear();
        self.selection.reset();
        self.target = None;
        self.load_tree(seed);
        self.clear_draft();
    }

    fn persist(&mut self) {
        let saved = draft::save_draft(self.drafts.as_mut(), &self.options.draft_key, &self.pending);
        if let Err(err) = saved {
            warn!(error = %format!("{err:#}"), "draft not saved");
        }
    }

    fn clear_draft(&mut self) {
        if let Err(err) = self.drafts.clear(&self.options.draft_key) {
            warn!(error = %format!("{err:#}"), "draft not cleared");
        }
    }
}
