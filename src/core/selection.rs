//! File-manager style multi-selection over the pending-item list.
//!
//! Transitions are pure functions of `(key, modifiers, order)`. The display
//! order is always passed in explicitly; the engine never assumes it matches
//! insertion order.

use std::ops::RangeInclusive;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on most platforms, Cmd on macOS.
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true };
}

pub(crate) fn inclusive_index_range(
    anchor_index: usize,
    target_index: usize,
    len: usize,
) -> Option<RangeInclusive<usize>> {
    if len == 0 || anchor_index >= len || target_index >= len {
        return None;
    }
    Some(anchor_index.min(target_index)..=anchor_index.max(target_index))
}

/// Selected keys plus the anchor used for range selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    selected: IndexSet<String>,
    anchor: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &IndexSet<String> {
        &self.selected
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Dispatches a click. Shift takes precedence over ctrl.
    pub fn click<S: AsRef<str>>(&mut self, key: &str, modifiers: Modifiers, order: &[S]) {
        if modifiers.shift {
            self.shift_click(key, order);
        } else if modifiers.ctrl {
            self.ctrl_click(key);
        } else {
            self.plain_click(key);
        }
    }

    /// Replaces the selection with `key`.
    pub fn plain_click(&mut self, key: &str) {
        self.selected.clear();
        self.selected.insert(key.to_string());
        self.anchor = Some(key.to_string());
    }

    pub fn ctrl_click(&mut self, key: &str) {
        self.toggle(key);
    }

    /// Checkbox input path: same toggle as ctrl-click, kept separate so the
    /// two inputs can diverge without touching callers.
    pub fn toggle_checkbox(&mut self, key: &str) {
        self.toggle(key);
    }

    fn toggle(&mut self, key: &str) {
        if !self.selected.shift_remove(key) {
            self.selected.insert(key.to_string());
        }
        self.anchor = Some(key.to_string());
    }

    /// Unions the range between the anchor and `key` into the selection.
    ///
    /// The anchor does not move. Without an anchor in `order` this is a plain
    /// click; a `key` missing from `order` is ignored.
    pub fn shift_click<S: AsRef<str>>(&mut self, key: &str, order: &[S]) {
        let Some(target_index) = order.iter().position(|k| k.as_ref() == key) else {
            return;
        };
        let anchor_index = self
            .anchor
            .as_deref()
            .and_then(|anchor| order.iter().position(|k| k.as_ref() == anchor));

        let range = anchor_index.and_then(|a| inclusive_index_range(a, target_index, order.len()));
        match range {
            Some(range) => {
                for k in &order[range] {
                    self.selected.insert(k.as_ref().to_string());
                }
            }
            None => self.plain_click(key),
        }
    }

    pub fn select_all<S: AsRef<str>>(&mut self, order: &[S]) {
        self.selected = order.iter().map(|k| k.as_ref().to_string()).collect();
        self.anchor = order.first().map(|k| k.as_ref().to_string());
    }

    /// Forgets keys whose items were consumed or deleted.
    pub fn remove_keys<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            self.selected.shift_remove(key);
            if self.anchor.as_deref() == Some(key) {
                self.anchor = None;
            }
        }
    }

    /// Drops keys that are no longer part of `order`.
    pub fn retain_known<S: AsRef<str>>(&mut self, order: &[S]) {
        let known: IndexSet<&str> = order.iter().map(AsRef::as_ref).collect();
        self.selected.retain(|k| known.contains(k.as_str()));
        if self.anchor.as_deref().is_some_and(|a| !known.contains(a)) {
            self.anchor = None;
        }
    }

    pub fn reset(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Selected keys in display order.
    pub fn selected_in_order<S: AsRef<str>>(&self, order: &[S]) -> Vec<String> {
        order
            .iter()
            .map(AsRef::as_ref)
            .filter(|k| self.selected.contains(*k))
            .map(str::to_string)
            .collect()
    }
}
