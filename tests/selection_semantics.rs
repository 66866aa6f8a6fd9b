//! Pending-list selection: plain, shift-range, ctrl-toggle and checkbox.

use cattree::core::{Modifiers, SelectionState};
use proptest::prelude::*;

const ORDER: [&str; 5] = ["A", "B", "C", "D", "E"];

fn selected(state: &SelectionState) -> Vec<&str> {
    let mut keys: Vec<&str> = state.selected().iter().map(String::as_str).collect();
    keys.sort();
    keys
}

#[test]
fn shift_extends_from_anchor_and_ctrl_adds() {
    let mut state = SelectionState::new();

    state.click("B", Modifiers::NONE, &ORDER);
    state.click("D", Modifiers::SHIFT, &ORDER);
    assert_eq!(selected(&state), ["B", "C", "D"]);
    assert_eq!(state.anchor(), Some("B"));

    state.click("A", Modifiers::CTRL, &ORDER);
    assert_eq!(selected(&state), ["A", "B", "C", "D"]);
    assert_eq!(state.anchor(), Some("A"));

    // Range A..B is already covered; shift never removes.
    state.click("B", Modifiers::SHIFT, &ORDER);
    assert_eq!(selected(&state), ["A", "B", "C", "D"]);
}

#[test]
fn shift_backwards_covers_reverse_range() {
    let mut state = SelectionState::new();
    state.click("D", Modifiers::NONE, &ORDER);
    state.click("A", Modifiers::SHIFT, &ORDER);
    assert_eq!(selected(&state), ["A", "B", "C", "D"]);
}

#[test]
fn plain_click_replaces_everything() {
    let mut state = SelectionState::new();
    state.select_all(&ORDER);
    state.click("C", Modifiers::NONE, &ORDER);
    assert_eq!(selected(&state), ["C"]);
    assert_eq!(state.anchor(), Some("C"));
}

#[test]
fn ctrl_twice_deselects() {
    let mut state = SelectionState::new();
    state.click("B", Modifiers::CTRL, &ORDER);
    state.click("B", Modifiers::CTRL, &ORDER);
    assert!(state.is_empty());
}

#[test]
fn checkbox_behaves_like_ctrl() {
    let mut checkbox = SelectionState::new();
    let mut ctrl = SelectionState::new();
    for key in ["A", "C", "A", "E"] {
        checkbox.toggle_checkbox(key);
        ctrl.click(key, Modifiers::CTRL, &ORDER);
    }
    assert_eq!(checkbox, ctrl);
    assert_eq!(selected(&checkbox), ["C", "E"]);
}

#[test]
fn shift_without_anchor_is_plain_click() {
    let mut state = SelectionState::new();
    state.click("C", Modifiers::SHIFT, &ORDER);
    assert_eq!(selected(&state), ["C"]);
    assert_eq!(state.anchor(), Some("C"));
}

#[test]
fn removed_keys_leave_selection_and_anchor() {
    let mut state = SelectionState::new();
    state.click("B", Modifiers::NONE, &ORDER);
    state.click("D", Modifiers::SHIFT, &ORDER);
    state.remove_keys(["B", "C"]);
    assert_eq!(selected(&state), ["D"]);
    assert_eq!(state.anchor(), None);
}

fn modifiers() -> impl Strategy<Value = Modifiers> {
    prop_oneof![Just(Modifiers::NONE), Just(Modifiers::SHIFT), Just(Modifiers::CTRL)]
}

proptest! {
    #[test]
    fn selection_stays_within_known_keys(
        clicks in prop::collection::vec((0usize..5, modifiers()), 0..20),
    ) {
        let mut state = SelectionState::new();
        for (idx, mods) in clicks {
            let before: Vec<String> = state.selected().iter().cloned().collect();
            state.click(ORDER[idx], mods, &ORDER);

            for key in state.selected() {
                prop_assert!(ORDER.contains(&key.as_str()));
            }
            if mods == Modifiers::SHIFT && !before.is_empty() {
                for key in &before {
                    prop_assert!(state.is_selected(key));
                }
            }
        }
    }
}
