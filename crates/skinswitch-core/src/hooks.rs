//! Vetoable transition hooks.
//!
//! Hooks run synchronously inside a transition, before any mutation. A hook
//! that returns `Err(Veto)` aborts the transition with no side effects; the
//! coordinator propagates it with `?`.

use std::fmt;
use std::rc::Rc;

/// A hook declined the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Veto;

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition vetoed by hook")
    }
}

impl std::error::Error for Veto {}

/// Outcome of a vetoable hook.
pub type HookResult = Result<(), Veto>;

type SelectFn = Rc<dyn Fn(&str, Option<&str>, bool) -> HookResult>;
type LoadFn = Rc<dyn Fn(&str, Option<&str>)>;
type ResetFn = Rc<dyn Fn(Option<&str>, Option<&str>, bool) -> HookResult>;
type RememberFn = Rc<dyn Fn(bool) -> HookResult>;

/// The four per-instance callbacks. Unset hooks always proceed.
#[derive(Clone, Default)]
pub struct SwitcherHooks {
    on_select: Option<SelectFn>,
    on_load: Option<LoadFn>,
    on_reset: Option<ResetFn>,
    on_remember: Option<RememberFn>,
}

impl SwitcherHooks {
    /// `on_select(new, current, remembering)`.
    pub fn on_select(mut self, f: impl Fn(&str, Option<&str>, bool) -> HookResult + 'static) -> Self {
        self.on_select = Some(Rc::new(f));
        self
    }

    /// `on_load(new, previous)`. Notification only.
    pub fn on_load(mut self, f: impl Fn(&str, Option<&str>) + 'static) -> Self {
        self.on_load = Some(Rc::new(f));
        self
    }

    /// `on_reset(current, reset_skin, remembering)`.
    pub fn on_reset(
        mut self,
        f: impl Fn(Option<&str>, Option<&str>, bool) -> HookResult + 'static,
    ) -> Self {
        self.on_reset = Some(Rc::new(f));
        self
    }

    /// `on_remember(new_remembering)`.
    pub fn on_remember(mut self, f: impl Fn(bool) -> HookResult + 'static) -> Self {
        self.on_remember = Some(Rc::new(f));
        self
    }

    pub(crate) fn select(&self, new: &str, current: Option<&str>, remembering: bool) -> HookResult {
        match &self.on_select {
            Some(f) => f(new, current, remembering),
            None => Ok(()),
        }
    }

    pub(crate) fn load(&self, new: &str, previous: Option<&str>) {
        if let Some(f) = &self.on_load {
            f(new, previous);
        }
    }

    pub(crate) fn reset(
        &self,
        current: Option<&str>,
        reset_skin: Option<&str>,
        remembering: bool,
    ) -> HookResult {
        match &self.on_reset {
            Some(f) => f(current, reset_skin, remembering),
            None => Ok(()),
        }
    }

    pub(crate) fn remember(&self, new_remembering: bool) -> HookResult {
        match &self.on_remember {
            Some(f) => f(new_remembering),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for SwitcherHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitcherHooks")
            .field("on_select", &self.on_select.is_some())
            .field("on_load", &self.on_load.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .field("on_remember", &self.on_remember.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn unset_hooks_proceed() {
        let hooks = SwitcherHooks::default();
        assert_eq!(hooks.select("A", None, false), Ok(()));
        assert_eq!(hooks.reset(Some("A"), None, true), Ok(()));
        assert_eq!(hooks.remember(true), Ok(()));
        hooks.load("A", None);
    }

    #[test]
    fn select_hook_can_veto() {
        let hooks = SwitcherHooks::default().on_select(|new, _, _| {
            if new == "Vader" { Err(Veto) } else { Ok(()) }
        });
        assert_eq!(hooks.select("Vader", Some("Sunny"), false), Err(Veto));
        assert_eq!(hooks.select("Sunny", None, false), Ok(()));
    }

    #[test]
    fn load_hook_receives_previous() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let hooks = SwitcherHooks::default().on_load(move |new, prev| {
            sink.borrow_mut().push((new.to_string(), prev.map(str::to_string)));
        });
        hooks.load("B", Some("A"));
        assert_eq!(*seen.borrow(), vec![("B".to_string(), Some("A".to_string()))]);
    }

    #[test]
    fn debug_shows_which_hooks_are_set() {
        let hooks = SwitcherHooks::default().on_remember(|_| Ok(()));
        let dbg = format!("{hooks:?}");
        assert!(dbg.contains("on_remember: true"));
        assert!(dbg.contains("on_select: false"));
    }

    #[test]
    fn veto_display() {
        assert_eq!(Veto.to_string(), "transition vetoed by hook");
    }
}
