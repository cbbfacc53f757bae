//! # Selection Set
//!
//! Record identifiers chosen for a bulk action. The set is kept a subset of
//! the owning store's identifiers by calling [`SelectionSet::retain`] after
//! every refresh.

use std::collections::BTreeSet;

use mec_core::RecordId;

/// Identifiers selected for bulk deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Select exactly the given identifiers, or clear with `None`.
    pub fn select_all(&mut self, ids: Option<&[RecordId]>) {
        self.ids = ids.map(|ids| ids.iter().cloned().collect()).unwrap_or_default();
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Deselect one identifier, e.g. after its record was deleted.
    pub fn forget(&mut self, id: &RecordId) {
        self.ids.remove(id);
    }

    /// Drop every selected identifier not in `present`.
    pub fn retain(&mut self, present: &[RecordId]) {
        self.ids.retain(|id| present.contains(id));
    }

    /// Whether the selection is exactly the candidate list. False for an
    /// empty candidate list.
    pub fn is_all_selected(&self, candidates: &[RecordId]) -> bool {
        !candidates.is_empty()
            && candidates.iter().all(|id| self.ids.contains(id))
            && self.ids.iter().all(|id| candidates.contains(id))
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected identifiers in sorted order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<RecordId> {
        names.iter().map(|n| RecordId::new(*n).unwrap()).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionSet::new();
        let id = RecordId::new("s1").unwrap();
        assert!(selection.toggle(&id));
        assert!(selection.contains(&id));
        assert!(!selection.toggle(&id));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_and_clear() {
        let mut selection = SelectionSet::new();
        let all = ids(&["a", "b", "c"]);
        selection.select_all(Some(&all));
        assert!(selection.is_all_selected(&all));
        selection.select_all(None);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_candidates_are_never_all_selected() {
        let selection = SelectionSet::new();
        assert!(!selection.is_all_selected(&[]));
    }

    #[test]
    fn extra_selected_ids_are_not_all_selected() {
        let mut selection = SelectionSet::new();
        selection.select_all(Some(&ids(&["a", "b", "c"])));
        assert!(!selection.is_all_selected(&ids(&["a", "b"])));
    }

    #[test]
    fn retain_drops_vanished_ids() {
        let mut selection = SelectionSet::new();
        selection.select_all(Some(&ids(&["a", "b", "c"])));
        selection.retain(&ids(&["b", "d"]));
        assert_eq!(selection.ids(), ids(&["b"]));
    }

    proptest! {
        #[test]
        fn double_toggle_is_identity(
            initial in proptest::collection::btree_set("[a-z]{1,4}", 0..8),
            target in "[a-z]{1,4}",
        ) {
            let mut selection = SelectionSet::new();
            let initial: Vec<RecordId> = initial.iter().map(|s| RecordId::new(s.clone()).unwrap()).collect();
            selection.select_all(Some(&initial));
            let before = selection.clone();
            let target = RecordId::new(target).unwrap();
            selection.toggle(&target);
            selection.toggle(&target);
            prop_assert_eq!(selection, before);
        }

        #[test]
        fn retain_keeps_selection_a_subset(
            selected in proptest::collection::vec("[a-f]", 0..8),
            present in proptest::collection::vec("[a-f]", 0..8),
        ) {
            let mut selection = SelectionSet::new();
            for s in &selected {
                selection.toggle(&RecordId::new(s.clone()).unwrap());
            }
            let present: Vec<RecordId> = present.into_iter().map(|s| RecordId::new(s).unwrap()).collect();
            selection.retain(&present);
            for id in selection.ids() {
                prop_assert!(present.contains(&id));
            }
        }
    }
}
