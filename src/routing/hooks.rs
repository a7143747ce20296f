//! Transition hooks and the pipeline that runs them.
//!
//! # Responsibilities
//! - Hold `before` / `after` / `leave` callbacks for a route or the whole router
//! - Wrap a handler invocation with `before` and `after`
//! - Hand `before` a single-shot continuation that decides whether to proceed
//!
//! # Design Decisions
//! - Everything runs on the caller's thread; nothing here blocks or times out
//! - The continuation may be invoked during `before` or any time later, the
//!   handler fires when it is invoked, not when `before` returns
//! - Dropping the continuation without invoking it aborts the transition

use std::fmt;
use std::rc::Rc;

use crate::routing::pattern::Params;

pub type BeforeFn = dyn Fn(Next, Option<&Params>);
pub type AfterFn = dyn Fn(Option<&Params>);

/// A set of transition hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    before: Option<Rc<BeforeFn>>,
    after: Option<Rc<AfterFn>>,
    leave: Option<Rc<AfterFn>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before the handler. The handler only fires once the given
    /// [`Next`] is resumed with `true`.
    pub fn before(mut self, f: impl Fn(Next, Option<&Params>) + 'static) -> Self {
        self.before = Some(Rc::new(f));
        self
    }

    /// Runs after the handler.
    pub fn after(mut self, f: impl Fn(Option<&Params>) + 'static) -> Self {
        self.after = Some(Rc::new(f));
        self
    }

    /// Runs when the router resolves away from this route.
    pub fn leave(mut self, f: impl Fn(Option<&Params>) + 'static) -> Self {
        self.leave = Some(Rc::new(f));
        self
    }

    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    pub fn has_after(&self) -> bool {
        self.after.is_some()
    }

    pub fn has_leave(&self) -> bool {
        self.leave.is_some()
    }

    pub(crate) fn leave_hook(&self) -> Option<Rc<AfterFn>> {
        self.leave.clone()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.has_before())
            .field("after", &self.has_after())
            .field("leave", &self.has_leave())
            .finish()
    }
}

/// Single-shot continuation handed to a `before` hook.
#[must_use = "dropping the continuation aborts the transition"]
pub struct Next {
    proceed: Box<dyn FnOnce()>,
}

impl Next {
    pub(crate) fn new(proceed: impl FnOnce() + 'static) -> Self {
        Self {
            proceed: Box::new(proceed),
        }
    }

    /// Continue the transition when `should_route` is true, abort otherwise.
    pub fn resume(self, should_route: bool) {
        if should_route {
            (self.proceed)();
        } else {
            tracing::trace!("transition declined by before hook");
        }
    }

    pub fn proceed(self) {
        self.resume(true);
    }

    pub fn cancel(self) {
        self.resume(false);
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Run `handler` wrapped by `hooks`.
pub(crate) fn run(hooks: Option<&Hooks>, params: Option<Params>, handler: Box<dyn FnOnce()>) {
    let Some(hooks) = hooks else {
        handler();
        return;
    };

    match (&hooks.before, &hooks.after) {
        (Some(before), after) => {
            let after = after.clone();
            let for_after = params.clone();
            tracing::trace!("running before hook");
            before(
                Next::new(move || {
                    handler();
                    if let Some(after) = after {
                        after(for_after.as_ref());
                    }
                }),
                params.as_ref(),
            );
        }
        (None, Some(after)) => {
            handler();
            after(params.as_ref());
        }
        (None, None) => handler(),
    }
}

/// Run `handler` inside `inner` hooks, themselves inside `outer` hooks.
pub(crate) fn run_nested(
    outer: Option<Hooks>,
    inner: Option<Hooks>,
    params: Option<Params>,
    handler: Box<dyn FnOnce()>,
) {
    let inner_params = params.clone();
    run(
        outer.as_ref(),
        params,
        Box::new(move || run(inner.as_ref(), inner_params, handler)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn push(log: &Log, s: &str) {
        log.borrow_mut().push(s.to_string());
    }

    fn handler(log: &Log) -> Box<dyn FnOnce()> {
        let log = log.clone();
        Box::new(move || push(&log, "handler"))
    }

    #[test]
    fn test_no_hooks_runs_handler() {
        let log = Log::default();
        run(None, None, handler(&log));
        run(Some(&Hooks::new()), None, handler(&log));
        assert_eq!(*log.borrow(), vec!["handler", "handler"]);
    }

    #[test]
    fn test_after_without_before() {
        let log = Log::default();
        let l = log.clone();
        let hooks = Hooks::new().after(move |_| push(&l, "after"));
        run(Some(&hooks), None, handler(&log));
        assert_eq!(*log.borrow(), vec!["handler", "after"]);
    }

    #[test]
    fn test_before_receives_params() {
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        let hooks = Hooks::new().before(move |next, params| {
            *s.borrow_mut() = params.cloned();
            next.proceed();
        });
        let mut params = Params::new();
        params.insert("id".into(), "7".into());
        run(Some(&hooks), Some(params.clone()), Box::new(|| {}));
        assert_eq!(*seen.borrow(), Some(params));
    }

    #[test]
    fn test_declined_before_skips_handler_and_after() {
        let log = Log::default();
        let l = log.clone();
        let hooks = Hooks::new()
            .before(|next, _| next.resume(false))
            .after(move |_| push(&l, "after"));
        run(Some(&hooks), None, handler(&log));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_dropped_continuation_aborts() {
        let log = Log::default();
        let hooks = Hooks::new().before(|_next, _| {});
        run(Some(&hooks), None, handler(&log));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_deferred_continuation() {
        let log = Log::default();
        let parked: Rc<RefCell<Option<Next>>> = Rc::default();
        let p = parked.clone();
        let l = log.clone();
        let hooks = Hooks::new()
            .before(move |next, _| *p.borrow_mut() = Some(next))
            .after(move |_| push(&l, "after"));

        run(Some(&hooks), None, handler(&log));
        assert!(log.borrow().is_empty());

        let next = parked.borrow_mut().take().unwrap();
        next.proceed();
        assert_eq!(*log.borrow(), vec!["handler", "after"]);
    }

    #[test]
    fn test_nested_order() {
        let log = Log::default();
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        let outer = Hooks::new()
            .before(move |next, _| {
                push(&a, "outer-before");
                next.proceed();
            })
            .after(move |_| push(&b, "outer-after"));
        let inner = Hooks::new()
            .before(move |next, _| {
                push(&c, "inner-before");
                next.proceed();
            })
            .after(move |_| push(&d, "inner-after"));

        run_nested(Some(outer), Some(inner), None, handler(&log));
        assert_eq!(
            *log.borrow(),
            vec!["outer-before", "inner-before", "handler", "inner-after", "outer-after"]
        );
    }
}
