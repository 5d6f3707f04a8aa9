//! Unsaved-changes tracking for editor pages.

mod draft;

pub use draft::Draft;

/// Where the guard stands relative to the last successful save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Clean,
    Dirty,
    /// The user tried to leave with unsaved edits; a dialog is open.
    ConfirmingLeave {
        target: String,
        /// Set once "Save & Leave" has been chosen and the save is in flight.
        saving: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardEvent {
    Edit,
    Saved,
    SaveFailed,
    NavigateRequested(String),
    SaveAndLeave,
    LeaveWithoutSaving,
    Cancel,
}

/// Side effects the page has to carry out after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardAction {
    Navigate(String),
    Persist,
    Discard,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationGuard {
    state: GuardState,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        !matches!(self.state, GuardState::Clean)
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, GuardState::ConfirmingLeave { .. })
    }

    /// Whether closing the tab should raise the browser's own prompt.
    pub fn blocks_unload(&self) -> bool {
        self.is_dirty()
    }

    pub fn handle(&mut self, event: GuardEvent) -> Vec<GuardAction> {
        use GuardEvent as E;
        use GuardState as S;

        let (next, actions) = match (std::mem::take(&mut self.state), event) {
            (S::Clean | S::Dirty, E::Edit) => (S::Dirty, vec![]),
            (S::Clean | S::Dirty, E::Saved) => (S::Clean, vec![]),
            (S::Clean, E::NavigateRequested(target)) => (S::Clean, vec![GuardAction::Navigate(target)]),
            (S::Dirty, E::NavigateRequested(target)) => (
                S::ConfirmingLeave {
                    target,
                    saving: false,
                },
                vec![],
            ),

            (S::ConfirmingLeave { target, saving: false }, E::SaveAndLeave) => (
                S::ConfirmingLeave {
                    target,
                    saving: true,
                },
                vec![GuardAction::Persist],
            ),
            (S::ConfirmingLeave { target, .. }, E::Saved) => {
                (S::Clean, vec![GuardAction::Navigate(target)])
            }
            (S::ConfirmingLeave { saving: true, .. }, E::SaveFailed) => (S::Dirty, vec![]),
            (S::ConfirmingLeave { target, saving: false }, E::LeaveWithoutSaving) => (
                S::Clean,
                vec![GuardAction::Discard, GuardAction::Navigate(target)],
            ),
            (S::ConfirmingLeave { saving: false, .. }, E::Cancel) => (S::Dirty, vec![]),

            // Anything else (edits behind the modal dialog, stray dialog buttons) is ignored.
            (state, event) => {
                tracing::trace!(?state, ?event, "navigation guard ignored event");
                (state, vec![])
            }
        };

        self.state = next;
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirty() -> NavigationGuard {
        let mut g = NavigationGuard::new();
        g.handle(GuardEvent::Edit);
        g
    }

    #[test]
    fn test_edit_and_save_cycle() {
        let mut g = NavigationGuard::new();
        assert!(!g.blocks_unload());
        assert!(g.handle(GuardEvent::Edit).is_empty());
        assert_eq!(g.state(), &GuardState::Dirty);
        assert!(g.blocks_unload());
        g.handle(GuardEvent::Saved);
        assert_eq!(g.state(), &GuardState::Clean);
    }

    #[test]
    fn test_clean_navigation_goes_through() {
        let mut g = NavigationGuard::new();
        assert_eq!(
            g.handle(GuardEvent::NavigateRequested("/banners".into())),
            vec![GuardAction::Navigate("/banners".into())]
        );
        assert_eq!(g.state(), &GuardState::Clean);
    }

    #[test]
    fn test_dirty_navigation_asks_first() {
        let mut g = dirty();
        assert!(g.handle(GuardEvent::NavigateRequested("/".into())).is_empty());
        assert!(g.is_confirming());
    }

    #[test]
    fn test_leave_without_saving_discards() {
        let mut g = dirty();
        g.handle(GuardEvent::NavigateRequested("/".into()));
        assert_eq!(
            g.handle(GuardEvent::LeaveWithoutSaving),
            vec![GuardAction::Discard, GuardAction::Navigate("/".into())]
        );
        assert_eq!(g.state(), &GuardState::Clean);
    }

    #[test]
    fn test_save_and_leave_waits_for_persist() {
        let mut g = dirty();
        g.handle(GuardEvent::NavigateRequested("/council".into()));
        assert_eq!(g.handle(GuardEvent::SaveAndLeave), vec![GuardAction::Persist]);
        assert!(g.is_confirming());
        // Dialog buttons are inert while saving.
        assert!(g.handle(GuardEvent::Cancel).is_empty());
        assert_eq!(
            g.handle(GuardEvent::Saved),
            vec![GuardAction::Navigate("/council".into())]
        );
        assert_eq!(g.state(), &GuardState::Clean);
    }

    #[test]
    fn test_failed_save_returns_to_dirty() {
        let mut g = dirty();
        g.handle(GuardEvent::NavigateRequested("/".into()));
        g.handle(GuardEvent::SaveAndLeave);
        assert!(g.handle(GuardEvent::SaveFailed).is_empty());
        assert_eq!(g.state(), &GuardState::Dirty);
    }

    #[test]
    fn test_cancel_stays_on_page() {
        let mut g = dirty();
        g.handle(GuardEvent::NavigateRequested("/".into()));
        assert!(g.handle(GuardEvent::Cancel).is_empty());
        assert_eq!(g.state(), &GuardState::Dirty);
    }

    #[test]
    fn test_edits_behind_dialog_are_ignored() {
        let mut g = dirty();
        g.handle(GuardEvent::NavigateRequested("/x".into()));
        g.handle(GuardEvent::Edit);
        assert_eq!(
            g.state(),
            &GuardState::ConfirmingLeave {
                target: "/x".into(),
                saving: false
            }
        );
    }
}
