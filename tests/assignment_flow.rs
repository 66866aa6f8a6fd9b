//! Full editing sessions through `AssignmentController`.

mod util;

use cattree::core::{
    AssignError, AssignmentController, DropEvent, MemoryDraftStore, Modifiers, PendingItem,
    SubmitError, TreeError, TreeNode,
    assign::SessionOptions,
    draft::{self, DEFAULT_DRAFT_KEY, FileDraftStore},
    store::{count_nodes, find_by_key, parent_key_of, validate},
};
use tempfile::TempDir;
use util::{catalog_tree, pending, r_a_seed};

#[test]
fn widget_lands_under_leaf_target() {
    let mut session = AssignmentController::new(r_a_seed());
    session.enter_assignment(vec![PendingItem::new("X", "Widget")]);
    session.click("X", Modifiers::NONE);
    session.set_target(Some("A".into()));

    let report = session.assign_selected().unwrap();
    assert_eq!(report.assigned, ["X"]);
    assert_eq!(report.remaining, 0);

    let a = find_by_key(session.tree(), "A").unwrap();
    assert!(!a.is_leaf);
    assert_eq!(a.children, vec![TreeNode::leaf("X", "Widget")]);
    assert!(session.pending().is_empty());
    assert!(session.selection().is_empty());
    assert!(session.expansion().is_expanded("A"));
}

#[test]
fn range_selection_feeds_assignment() {
    let mut session = AssignmentController::new(catalog_tree());
    session.enter_assignment(pending(&["p1", "p2", "p3", "p4"]));
    session.click("p2", Modifiers::NONE);
    session.click("p4", Modifiers::SHIFT);
    session.set_target(Some("semi".into()));

    session.assign_selected().unwrap();

    let semi = find_by_key(session.tree(), "semi").unwrap();
    let keys: Vec<&str> = semi.children.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, ["diode", "tvs", "p2", "p3", "p4"]);
    let left: Vec<&str> = session.pending().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(left, ["p1"]);
}

#[test]
fn rejected_assignment_changes_nothing() {
    let mut session = AssignmentController::new(catalog_tree());
    session.enter_assignment(pending(&["p1"]));
    let before = session.tree().to_vec();

    assert_eq!(session.assign_selected(), Err(AssignError::EmptySelection));

    session.toggle_checkbox("p1");
    assert_eq!(session.assign_selected(), Err(AssignError::NoTarget));

    assert_eq!(session.tree(), before.as_slice());
    assert_eq!(session.pending().len(), 1);
    assert!(session.selection().is_selected("p1"));
}

#[test]
fn drag_then_submit() {
    let mut session = AssignmentController::new(catalog_tree());
    let total = count_nodes(session.tree());

    // Onto a node: becomes its first child.
    session.drag(&DropEvent::onto("mech", "semi")).unwrap();
    assert_eq!(parent_key_of(session.tree(), "mech").as_deref(), Some("semi"));
    assert_eq!(find_by_key(session.tree(), "semi").unwrap().children[0].key, "mech");

    // Gap above a root.
    session.drag(&DropEvent::above("res", "elec")).unwrap();
    assert_eq!(session.tree()[0].key, "res");

    assert_eq!(count_nodes(session.tree()), total);
    validate(session.tree()).unwrap();

    let submission = session.finalize(false).unwrap();
    assert_eq!(submission.tree, session.tree());
    assert!(submission.discarded.is_empty());
}

#[test]
fn submit_with_leftovers_needs_confirmation() {
    let mut session = AssignmentController::new(r_a_seed());
    session.enter_assignment(pending(&["X", "Y"]));
    session.toggle_checkbox("X");
    session.set_target(Some("R".into()));
    session.assign_selected().unwrap();

    match session.finalize(false) {
        Err(SubmitError::IncompleteSubmission { remaining }) => {
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].key, "Y");
        }
        other => panic!("expected incomplete submission, got {other:?}"),
    }

    let submission = session.finalize(true).unwrap();
    assert_eq!(submission.discarded.len(), 1);
    assert!(session.pending().is_empty());
}

#[test]
fn draft_survives_a_new_session() {
    let tmp = TempDir::new().unwrap();
    let options = SessionOptions::default();

    {
        let mut first = AssignmentController::with_options(
            r_a_seed(),
            options.clone(),
            Box::new(FileDraftStore::new(tmp.path())),
        );
        first.enter_assignment(pending(&["X", "Y", "Z"]));
        first.toggle_checkbox("Y");
        first.set_target(Some("A".into()));
        first.assign_selected().unwrap();
    }

    let saved = draft::load_draft(&FileDraftStore::new(tmp.path()), DEFAULT_DRAFT_KEY).unwrap();
    let keys: Vec<&str> = saved.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, ["X", "Z"]);

    let drafts = Box::new(FileDraftStore::new(tmp.path()));
    let mut second = AssignmentController::with_options(r_a_seed(), options, drafts);
    assert!(second.restore_draft());
    assert_eq!(second.pending().len(), 2);

    second.cancel();
    assert!(second.pending().is_empty());
    assert!(draft::load_draft(&FileDraftStore::new(tmp.path()), DEFAULT_DRAFT_KEY).is_none());
}

#[test]
fn corrupt_draft_is_ignored() {
    let mut store = MemoryDraftStore::new();
    cattree::core::DraftStore::write(&mut store, DEFAULT_DRAFT_KEY, "{not json").unwrap();

    let mut session =
        AssignmentController::with_options(r_a_seed(), SessionOptions::default(), Box::new(store));
    assert!(!session.restore_draft());
    assert!(session.pending().is_empty());
}

#[test]
fn stale_subtree_load_is_dropped() {
    let mut session = AssignmentController::new(r_a_seed());

    let ticket = session.begin_load("A");
    session.load_tree(r_a_seed());
    assert!(!session.complete_load(&ticket, vec![TreeNode::leaf("late", "Late")]));
    assert!(find_by_key(session.tree(), "late").is_none());

    let ticket = session.begin_load("A");
    assert!(session.complete_load(&ticket, vec![TreeNode::leaf("fresh", "Fresh")]));
    assert_eq!(parent_key_of(session.tree(), "fresh").as_deref(), Some("A"));
}

#[test]
fn reorder_moves_siblings_or_changes_nothing() {
    let mut session = AssignmentController::new(catalog_tree());

    session.reorder(Some("semi"), 1, 0).unwrap();
    let semi = find_by_key(session.tree(), "semi").unwrap();
    let keys: Vec<&str> = semi.children.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, ["tvs", "diode"]);

    session.reorder(None, 1, 0).unwrap();
    assert_eq!(session.tree()[0].key, "mech");

    let before = session.tree().to_vec();
    assert_eq!(
        session.reorder(Some("semi"), 0, 2),
        Err(TreeError::IndexOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        session.reorder(Some("gone"), 0, 0),
        Err(TreeError::TargetNotFound("gone".into()))
    );
    assert_eq!(session.tree(), before.as_slice());
}

#[test]
fn search_reveals_matches_in_the_session() {
    let mut session = AssignmentController::new(catalog_tree());
    assert!(session.expansion().is_expanded("mech"));

    assert_eq!(session.search(""), 0);
    assert!(session.expansion().is_expanded("mech"));

    assert_eq!(session.search("Diode"), 2);
    assert!(session.expansion().is_expanded("elec"));
    assert!(session.expansion().is_expanded("semi"));
    assert!(!session.expansion().is_expanded("pass"));
    assert!(!session.expansion().is_expanded("mech"));
    assert!(session.expansion().auto_expand_parent());
}

#[test]
fn session_view_serializes_for_the_ui() {
    let mut session = AssignmentController::new(r_a_seed());
    session.enter_assignment(pending(&["X"]));
    session.toggle_checkbox("X");
    session.set_target(Some("A".into()));

    let view = serde_json::to_value(session.view()).unwrap();
    assert_eq!(view["target"], "A");
    assert_eq!(view["selection"]["selected"], serde_json::json!(["X"]));
    assert_eq!(view["pending"][0]["key"], "X");
    assert_eq!(view["tree"][0]["children"][0]["isLeaf"], true);
}
