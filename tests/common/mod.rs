//! Shared helpers for router integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use page_router::platform::MemoryPlatform;
use page_router::{Handler, Hooks, Router};

pub const ROOT: &str = "http://localhost:8080";

/// Ordered record of what fired.
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::default()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

/// Router rooted at [`ROOT`] over a fresh in-memory history at `path`.
pub fn setup(path: &str) -> (Rc<MemoryPlatform>, Router) {
    let platform = Rc::new(MemoryPlatform::new(format!("{ROOT}{path}")));
    let router = Router::with_root(platform.clone(), ROOT);
    (platform, router)
}

/// Handler that records `label`, plus params (sorted `k=v`) when present.
pub fn record(log: &Log, label: &str) -> Handler {
    let log = log.clone();
    let label = label.to_string();
    Handler::new(move |args| {
        let mut entry = label.clone();
        if let Some(params) = args.params() {
            let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            entry.push_str(&format!("({})", pairs.join(",")));
        }
        push(&log, entry);
    })
}

/// `before` that records `{prefix}-before` and proceeds, `after` that records `{prefix}-after`.
pub fn tracing_hooks(log: &Log, prefix: &str) -> Hooks {
    let (b, a) = (log.clone(), log.clone());
    let (pb, pa) = (format!("{prefix}-before"), format!("{prefix}-after"));
    Hooks::new()
        .before(move |next, _| {
            push(&b, pb.clone());
            next.proceed();
        })
        .after(move |_| push(&a, pa.clone()))
}
