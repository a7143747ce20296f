//! In-memory platform: a history stack and a set of clickable links.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::platform::{ClickEvent, ClickListener, LinkElement, ListenerId, LocationListener, Platform};

/// History stack with browser-like back/forward behaviour.
pub struct MemoryPlatform {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
    listeners: RefCell<Vec<(ListenerId, LocationListener)>>,
    next_listener: Cell<u64>,
    links: RefCell<Vec<Rc<MemoryLink>>>,
    history_api: bool,
}

impl MemoryPlatform {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            entries: RefCell::new(vec![location.into()]),
            index: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            links: RefCell::new(Vec::new()),
            history_api: true,
        }
    }

    /// A host without a history API.
    pub fn without_history_api(mut self) -> Self {
        self.history_api = false;
        self
    }

    /// Move back one entry and notify listeners. Returns false at the start.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Move forward one entry and notify listeners. Returns false at the end.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    pub fn go(&self, delta: isize) -> bool {
        let len = self.entries.borrow().len();
        let Some(target) = self.index.get().checked_add_signed(delta) else {
            return false;
        };
        if delta == 0 || target >= len {
            return false;
        }
        self.index.set(target);
        self.notify();
        true
    }

    /// Replace the current entry without notifying anyone, as if the page
    /// had been loaded at `location`.
    pub fn visit(&self, location: impl Into<String>) {
        let index = self.index.get();
        self.entries.borrow_mut()[index] = location.into();
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn history_len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn add_link(&self, link: Rc<MemoryLink>) {
        self.links.borrow_mut().push(link);
    }

    fn notify(&self) {
        let listeners: Vec<LocationListener> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Platform for MemoryPlatform {
    fn current_location(&self) -> String {
        self.entries.borrow()[self.index.get()].clone()
    }

    fn push_state(&self, url: &str) {
        let mut entries = self.entries.borrow_mut();
        let index = self.index.get();
        entries.truncate(index + 1);
        entries.push(url.to_string());
        self.index.set(index + 1);
    }

    fn replace_state(&self, url: &str) {
        let index = self.index.get();
        self.entries.borrow_mut()[index] = url.to_string();
    }

    fn supports_history(&self) -> bool {
        self.history_api
    }

    fn listen(&self, listener: LocationListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }

    fn find_links(&self, attribute: &str) -> Vec<Rc<dyn LinkElement>> {
        self.links
            .borrow()
            .iter()
            .filter(|link| link.attribute(attribute).is_some())
            .map(|link| link.clone() as Rc<dyn LinkElement>)
            .collect()
    }
}

/// A clickable element.
pub struct MemoryLink {
    tag: String,
    attributes: BTreeMap<String, String>,
    wired: Cell<bool>,
    listeners: RefCell<Vec<ClickListener>>,
}

impl MemoryLink {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            wired: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// An `<a href=..>` carrying `marker`.
    pub fn anchor(href: impl Into<String>, marker: &str) -> Self {
        Self::new("a").attr("href", href).attr(marker, "")
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Plain click on this element.
    pub fn click(&self) -> bool {
        self.dispatch(ClickEvent::new(self.tag.clone()))
    }

    /// Dispatch `event` to every click listener. Returns whether the default
    /// action was prevented.
    pub fn dispatch(&self, event: ClickEvent) -> bool {
        let listeners: Vec<ClickListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
        event.default_prevented()
    }
}

impl LinkElement for MemoryLink {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn is_wired(&self) -> bool {
        self.wired.get()
    }

    fn mark_wired(&self) {
        self.wired.set(true);
    }

    fn add_click_listener(&self, listener: ClickListener) {
        self.listeners.borrow_mut().push(listener);
    }
}
