use std::collections::VecDeque;

const HISTORY_LIMIT: usize = 100;

/// In-memory edit buffer for one page: the last persisted value, the working copy and an
/// undo/redo history of whole snapshots.
///
/// Snapshots are cheap for `content::Node`, whose edits share untouched subtrees.
#[derive(Clone, Debug)]
pub struct Draft<T> {
    saved: T,
    current: T,
    undo: VecDeque<T>,
    redo: Vec<T>,
}

impl<T: Clone + PartialEq> Draft<T> {
    pub fn new(saved: T) -> Self {
        Self {
            current: saved.clone(),
            saved,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn saved(&self) -> &T {
        &self.saved
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }

    pub fn apply(&mut self, next: T) {
        let prev = std::mem::replace(&mut self.current, next);
        self.undo.push_back(prev);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        let cur = std::mem::replace(&mut self.current, prev);
        self.redo.push(cur);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let cur = std::mem::replace(&mut self.current, next);
        self.undo.push_back(cur);
        true
    }

    /// Drops every unsaved edit.
    pub fn discard(&mut self) {
        self.current = self.saved.clone();
        self.undo.clear();
        self.redo.clear();
    }

    /// Records the working copy as persisted.
    pub fn mark_saved(&mut self) {
        self.saved = self.current.clone();
    }

    /// Replaces everything with a freshly loaded value.
    pub fn reset(&mut self, saved: T) {
        *self = Self::new(saved);
    }
}

impl<T: Clone + PartialEq + Default> Default for Draft<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{self, Node, Path};
    use crate::guard::{GuardAction, GuardEvent, NavigationGuard};
    use serde_json::json;

    #[test]
    fn test_undo_redo() {
        let mut d = Draft::new(1);
        d.apply(2);
        d.apply(3);
        assert!(d.undo());
        assert_eq!(*d.current(), 2);
        assert!(d.redo());
        assert_eq!(*d.current(), 3);
        assert!(!d.redo());
        d.undo();
        d.apply(9);
        assert!(!d.can_redo());
    }

    #[test]
    fn test_dirty_follows_content_not_history() {
        let mut d = Draft::new("a".to_string());
        d.apply("b".to_string());
        assert!(d.is_dirty());
        d.apply("a".to_string());
        assert!(!d.is_dirty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut d = Draft::new(0usize);
        for i in 1..=HISTORY_LIMIT + 10 {
            d.apply(i);
        }
        let mut steps = 0;
        while d.undo() {
            steps += 1;
        }
        assert_eq!(steps, HISTORY_LIMIT);
        assert_eq!(*d.current(), 10);
    }

    #[test]
    fn test_leave_without_saving_restores_persisted_document() {
        let persisted = Node::from(json!({"hero": {"title": "Saved"}}));
        let mut draft = Draft::new(persisted.clone());
        let mut guard = NavigationGuard::new();

        let edited =
            content::set_value(draft.current(), &Path::parse("hero.title"), Node::text("Edited"))
                .unwrap();
        draft.apply(edited);
        guard.handle(GuardEvent::Edit);
        assert!(guard.is_dirty());

        guard.handle(GuardEvent::NavigateRequested("/".into()));
        for action in guard.handle(GuardEvent::LeaveWithoutSaving) {
            if action == GuardAction::Discard {
                draft.discard();
            }
        }

        assert!(!draft.is_dirty());
        assert!(draft.current().same_ref(&persisted));
    }
}
