//! Unsaved-changes handling shared by every editor page.
//!
//! The shell owns one [`LeaveIntercept`]. An editor page keeps its working copy in a
//! [`FormDraft`], which registers with the intercept while the page is mounted. Sidebar
//! links, signing out and closing the tab then go through that draft's
//! [`NavigationGuard`] before anything is thrown away.

use crate::guard::{Draft, GuardAction, GuardEvent, GuardState, NavigationGuard};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use std::fmt::Display;

/// Guard target used for signing out. Routes always start with `/`.
const SIGN_OUT_TARGET: &str = "#sign-out";

/// Where a confirmed leave goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Exit {
    Route(String),
    SignOut,
}

impl Exit {
    pub fn target(&self) -> String {
        match self {
            Exit::Route(route) => route.clone(),
            Exit::SignOut => SIGN_OUT_TARGET.to_string(),
        }
    }

    pub fn from_target(target: String) -> Self {
        if target == SIGN_OUT_TARGET {
            Exit::SignOut
        } else {
            Exit::Route(target)
        }
    }
}

/// What the shell renders for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShellView {
    Editor,
    /// The backend rejected the token while a page held unsaved edits: the page stays
    /// mounted behind a sign-in dialog.
    Expired,
    SignIn,
}

pub(crate) fn shell_view(authenticated: bool, invalidated: bool, unsaved: bool) -> ShellView {
    if authenticated {
        ShellView::Editor
    } else if invalidated && unsaved {
        ShellView::Expired
    } else {
        ShellView::SignIn
    }
}

#[derive(Clone, Copy)]
struct ActiveForm {
    guard: RwSignal<NavigationGuard>,
    persist: Callback<()>,
    discard: Callback<()>,
}

#[derive(Clone, Copy)]
pub(crate) struct LeaveIntercept {
    active: RwSignal<Option<ActiveForm>>,
    proceed: Callback<Exit>,
}

impl LeaveIntercept {
    pub fn new(proceed: Callback<Exit>) -> Self {
        Self {
            active: RwSignal::new(None),
            proceed,
        }
    }

    /// Registers the mounted form until the calling component is cleaned up.
    pub fn register(
        self,
        guard: RwSignal<NavigationGuard>,
        persist: Callback<()>,
        discard: Callback<()>,
    ) {
        self.active.set(Some(ActiveForm {
            guard,
            persist,
            discard,
        }));
        on_cleanup(move || {
            self.active.try_update(|active| {
                if active.as_ref().is_some_and(|f| f.guard == guard) {
                    *active = None;
                }
            });
        });
    }

    /// Leaves the current page, asking first if it holds unsaved edits.
    pub fn request(self, exit: Exit) {
        match self.active.get_untracked() {
            Some(form) => self.dispatch(form.guard, GuardEvent::NavigateRequested(exit.target())),
            None => self.proceed.run(exit),
        }
    }

    /// Answer from the "unsaved changes" dialog.
    pub fn answer(self, event: GuardEvent) {
        if let Some(form) = self.active.get_untracked() {
            self.dispatch(form.guard, event);
        }
    }

    /// Runs `event` through `guard` and carries out what it asks for. A form that is no
    /// longer mounted can't persist or navigate anymore, so its actions are dropped.
    pub fn dispatch(self, guard: RwSignal<NavigationGuard>, event: GuardEvent) {
        let Some(actions) = guard.try_update(|g| g.handle(event)) else {
            return;
        };
        let form = self
            .active
            .try_get_untracked()
            .flatten()
            .filter(|f| f.guard == guard);
        let Some(form) = form else {
            if !actions.is_empty() {
                tracing::debug!(?actions, "dropping actions of an unmounted form");
            }
            return;
        };

        for action in actions {
            match action {
                GuardAction::Persist => form.persist.run(()),
                GuardAction::Discard => form.discard.run(()),
                GuardAction::Navigate(target) => self.proceed.run(Exit::from_target(target)),
            }
        }
    }

    /// Runs the save of the form owning `guard`, if it is still mounted.
    fn persist(self, guard: RwSignal<NavigationGuard>) {
        let form = self.active.get_untracked().filter(|f| f.guard == guard);
        if let Some(form) = form {
            form.persist.run(());
        }
    }

    fn with_guard<R>(self, f: impl FnOnce(&NavigationGuard) -> R) -> Option<R> {
        self.active
            .with(|active| active.as_ref().and_then(|form| form.guard.try_with(f)))
    }

    pub fn confirming(self) -> bool {
        self.with_guard(NavigationGuard::is_confirming).unwrap_or(false)
    }

    /// "Save & leave" was chosen and the save is still running.
    pub fn awaiting_save(self) -> bool {
        self.with_guard(|g| matches!(g.state(), GuardState::ConfirmingLeave { saving: true, .. }))
            .unwrap_or(false)
    }

    pub fn holds_edits(self) -> bool {
        self.with_guard(NavigationGuard::is_dirty).unwrap_or(false)
    }

    pub fn blocks_unload(self) -> bool {
        self.active
            .try_get_untracked()
            .flatten()
            .and_then(|form| form.guard.try_with_untracked(NavigationGuard::blocks_unload))
            .unwrap_or(false)
    }
}

/// Working copy of one editor form with undo history and a leave guard.
pub(crate) struct FormDraft<T: Send + Sync + 'static> {
    pub draft: RwSignal<Draft<T>>,
    pub guard: RwSignal<NavigationGuard>,
    pub saving: RwSignal<bool>,
    /// Bumped whenever the value jumps (load, undo, discard) so inputs re-read it.
    pub revision: RwSignal<u64>,
    app: AppState,
    leave: LeaveIntercept,
}

impl<T: Send + Sync + 'static> Clone for FormDraft<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for FormDraft<T> {}

impl<T: Clone + PartialEq + Send + Sync + 'static> FormDraft<T> {
    /// Creates the draft and registers it with the shell. `persist` runs for "Save" and
    /// "Save & leave" and must finish with [`saved`](Self::saved) or
    /// [`save_failed`](Self::save_failed).
    pub fn new(initial: T, persist: impl Fn(Self) + Send + Sync + 'static) -> Self {
        let form = Self {
            draft: RwSignal::new(Draft::new(initial)),
            guard: RwSignal::new(NavigationGuard::new()),
            saving: RwSignal::new(false),
            revision: RwSignal::new(0),
            app: expect_context::<AppContext>().0,
            leave: expect_context::<LeaveIntercept>(),
        };
        form.leave.register(
            form.guard,
            Callback::new(move |_: ()| persist(form)),
            Callback::new(move |_: ()| form.throw_away()),
        );
        form
    }

    pub fn with<R>(self, f: impl FnOnce(&T) -> R) -> R {
        self.draft.with(|d| f(d.current()))
    }

    pub fn current(self) -> T {
        self.draft.with_untracked(|d| d.current().clone())
    }

    pub fn is_dirty(self) -> bool {
        self.guard.with(NavigationGuard::is_dirty)
    }

    pub fn dispatch(self, event: GuardEvent) {
        self.leave.dispatch(self.guard, event);
    }

    /// Replaces everything with a freshly fetched value.
    pub fn load(self, value: T) {
        self.draft.set(Draft::new(value));
        self.guard.set(NavigationGuard::new());
        self.revision.update(|r| *r += 1);
    }

    pub fn apply(self, next: T) {
        if self.draft.with_untracked(|d| d.current() == &next) {
            return;
        }
        self.draft.update(|d| d.apply(next));
        self.dispatch(GuardEvent::Edit);
    }

    pub fn update(self, f: impl FnOnce(&mut T)) {
        let mut next = self.current();
        f(&mut next);
        self.apply(next);
    }

    /// Like [`update`](Self::update), but a rejected edit becomes an error notice.
    pub fn edit<E: Display>(self, f: impl FnOnce(&mut T) -> Result<(), E>) {
        let mut next = self.current();
        match f(&mut next) {
            Ok(()) => self.apply(next),
            Err(e) => {
                tracing::warn!(error = %e, "edit rejected");
                self.app.error(e.to_string());
            }
        }
    }

    /// Undo or redo, keeping the guard in step with the draft.
    pub fn jump(self, step: impl FnOnce(&mut Draft<T>) -> bool) {
        if !self.draft.try_update(step).unwrap_or(false) {
            return;
        }
        self.revision.update(|r| *r += 1);
        if self.guard.with_untracked(NavigationGuard::is_confirming) {
            return;
        }
        let dirty = self.draft.with_untracked(|d| d.is_dirty());
        self.dispatch(if dirty { GuardEvent::Edit } else { GuardEvent::Saved });
    }

    fn throw_away(self) {
        self.draft.update(|d| d.discard());
        self.revision.update(|r| *r += 1);
    }

    /// "Discard changes" button.
    pub fn revert(self) {
        if self.guard.with_untracked(NavigationGuard::is_confirming) {
            return;
        }
        self.throw_away();
        self.dispatch(GuardEvent::Saved);
    }

    /// "Save" button.
    pub fn save(self) {
        self.leave.persist(self.guard);
    }

    /// Marks a save as started and returns the value to send; `None` while one is running.
    pub fn begin_save(self) -> Option<T> {
        if self.saving.get_untracked() {
            return None;
        }
        self.saving.set(true);
        Some(self.current())
    }

    /// Records a successful save of `sent`. `stored` replaces the working copy when the
    /// backend hands back something new (a server id, say). Edits made while the request
    /// was in flight stay unsaved.
    pub fn saved(self, sent: &T, stored: Option<T>) {
        let Some((still_dirty, replaced)) = self.draft.try_update(|d| {
            let mut replaced = false;
            if d.current() == sent {
                match stored {
                    Some(value) if &value != sent => {
                        d.reset(value);
                        replaced = true;
                    }
                    _ => d.mark_saved(),
                }
            }
            (d.is_dirty(), replaced)
        }) else {
            return;
        };
        self.saving.set(false);
        if replaced {
            self.revision.update(|r| *r += 1);
        }

        let confirming = self
            .guard
            .try_with_untracked(NavigationGuard::is_confirming)
            .unwrap_or(false);
        self.dispatch(if still_dirty && !confirming {
            GuardEvent::Edit
        } else {
            GuardEvent::Saved
        });
    }

    /// Ends a save that failed or never started (validation).
    pub fn save_failed(self) {
        self.saving.set(false);
        self.dispatch(GuardEvent::SaveFailed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn dirty_guard() -> RwSignal<NavigationGuard> {
        let mut g = NavigationGuard::new();
        g.handle(GuardEvent::Edit);
        RwSignal::new(g)
    }

    /// Intercept whose callbacks append to a shared log.
    fn recorder() -> (LeaveIntercept, Callback<()>, Callback<()>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let leave = LeaveIntercept::new(Callback::new(move |exit: Exit| {
            a.lock().unwrap().push(format!("{exit:?}"))
        }));
        let persist = Callback::new(move |_: ()| b.lock().unwrap().push("persist".into()));
        let discard = Callback::new(move |_: ()| c.lock().unwrap().push("discard".into()));
        (leave, persist, discard, log)
    }

    #[test]
    fn test_exit_targets() {
        assert_eq!(Exit::from_target(Exit::SignOut.target()), Exit::SignOut);
        assert_eq!(
            Exit::from_target("/banners".to_string()),
            Exit::Route("/banners".to_string())
        );
    }

    #[test]
    fn test_expired_session_keeps_unsaved_page_mounted() {
        assert_eq!(shell_view(true, false, true), ShellView::Editor);
        assert_eq!(shell_view(false, true, true), ShellView::Expired);
        assert_eq!(shell_view(false, true, false), ShellView::SignIn);
        assert_eq!(shell_view(false, false, true), ShellView::SignIn);
    }

    #[test]
    fn test_sign_out_with_unsaved_edits_asks_first() {
        let owner = Owner::new();
        owner.with(|| {
            let (leave, persist, discard, log) = recorder();
            let guard = dirty_guard();
            leave.register(guard, persist, discard);

            leave.request(Exit::SignOut);
            assert!(log.lock().unwrap().is_empty());
            assert!(leave.confirming());
            assert!(leave.blocks_unload());

            leave.answer(GuardEvent::LeaveWithoutSaving);
            assert_eq!(*log.lock().unwrap(), vec!["discard".to_string(), "SignOut".to_string()]);
            assert!(!leave.holds_edits());
        });
    }

    #[test]
    fn test_save_and_leave_waits_for_the_save() {
        let owner = Owner::new();
        owner.with(|| {
            let (leave, persist, discard, log) = recorder();
            let guard = dirty_guard();
            leave.register(guard, persist, discard);

            leave.request(Exit::Route("/council".into()));
            leave.answer(GuardEvent::SaveAndLeave);
            assert!(leave.awaiting_save());
            assert_eq!(*log.lock().unwrap(), vec!["persist".to_string()]);

            leave.dispatch(guard, GuardEvent::SaveFailed);
            assert!(!leave.confirming());
            assert!(leave.holds_edits());

            leave.request(Exit::Route("/council".into()));
            leave.answer(GuardEvent::SaveAndLeave);
            leave.dispatch(guard, GuardEvent::Saved);
            assert_eq!(
                log.lock().unwrap().last().map(String::as_str),
                Some(r#"Route("/council")"#)
            );
        });
    }

    #[test]
    fn test_clean_page_leaves_immediately() {
        let owner = Owner::new();
        owner.with(|| {
            let (leave, persist, discard, log) = recorder();
            leave.request(Exit::SignOut);
            leave.register(RwSignal::new(NavigationGuard::new()), persist, discard);
            leave.request(Exit::Route("/".into()));
            assert_eq!(
                *log.lock().unwrap(),
                vec!["SignOut".to_string(), r#"Route("/")"#.to_string()]
            );
        });
    }

    #[test]
    fn test_actions_of_a_replaced_form_are_dropped() {
        let owner = Owner::new();
        owner.with(|| {
            let (leave, persist, discard, log) = recorder();
            let old = dirty_guard();
            leave.register(old, persist, discard);
            leave.request(Exit::Route("/banners".into()));
            leave.answer(GuardEvent::SaveAndLeave);
            log.lock().unwrap().clear();

            leave.register(RwSignal::new(NavigationGuard::new()), persist, discard);
            leave.dispatch(old, GuardEvent::Saved);
            assert!(log.lock().unwrap().is_empty());
        });
    }
}
