//! Page activation by identifier.
//!
//! # Responsibilities
//! - Map page identifiers to activation handlers, registered up front
//! - Track the active page and fire a handler only on change
//!
//! # Design Decisions
//! - Identifiers are typed keys (usually an enum), never strings built at runtime
//! - Unknown identifiers are ignored, the active page stays as it was

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// Registry of pages keyed by `K`.
pub struct PageRegistry<K> {
    handlers: HashMap<K, Rc<dyn Fn()>>,
    active: Option<K>,
}

impl<K> PageRegistry<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            active: None,
        }
    }

    /// Register the handler fired when `page` becomes active.
    pub fn register(&mut self, page: K, on_show: impl Fn() + 'static) -> &mut Self {
        self.handlers.insert(page, Rc::new(on_show));
        self
    }

    pub fn contains(&self, page: &K) -> bool {
        self.handlers.contains_key(page)
    }

    pub fn active(&self) -> Option<&K> {
        self.active.as_ref()
    }

    /// Activate `page`. Returns true when it became active and its handler fired.
    pub fn show(&mut self, page: &K) -> bool {
        if self.active.as_ref() == Some(page) {
            return false;
        }
        let Some(handler) = self.handlers.get(page).cloned() else {
            tracing::warn!(page = ?page, "unknown page");
            return false;
        };

        tracing::debug!(page = ?page, "showing page");
        self.active = Some(page.clone());
        handler();
        true
    }
}

impl<K> Default for PageRegistry<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
