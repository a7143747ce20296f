//! Platform boundary: what the router needs from its host.
//!
//! # Data Flow
//! ```text
//! Router
//!     → current_location()           (read the address bar)
//!     → push_state / replace_state   (write a history entry)
//!     → listen(listener)             (history-change notification, back/forward)
//!     → find_links(attribute)        (marked anchors for click interception)
//!
//! Host (browser shim, MemoryPlatform)
//!     → invokes listeners when the user moves through history
//!     → invokes click listeners on marked links
//! ```
//!
//! # Design Decisions
//! - The router never implements these services, it only consumes them
//! - Single-threaded: trait objects are `Rc`, never `Arc`
//! - `memory` provides an in-process implementation for tests and the CLI

pub mod memory;

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use memory::{MemoryLink, MemoryPlatform};

/// How navigation writes the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Add a new entry.
    #[default]
    Push,
    /// Overwrite the current entry.
    Replace,
}

/// Handle returned by [`Platform::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type LocationListener = Rc<dyn Fn()>;
pub type ClickListener = Rc<dyn Fn(&ClickEvent)>;

/// Host services consumed by the router.
pub trait Platform {
    /// Full current location, e.g. `http://host/app/queue?page=2`.
    fn current_location(&self) -> String;

    fn push_state(&self, url: &str);

    fn replace_state(&self, url: &str);

    /// Whether the host offers a history API at all.
    fn supports_history(&self) -> bool {
        true
    }

    /// Subscribe to history-change notifications (back/forward).
    fn listen(&self, listener: LocationListener) -> ListenerId;

    fn unlisten(&self, id: ListenerId);

    /// Elements carrying `attribute`, in document order.
    fn find_links(&self, attribute: &str) -> Vec<Rc<dyn LinkElement>>;
}

/// A link element the router can wire for client-side navigation.
pub trait LinkElement {
    fn attribute(&self, name: &str) -> Option<String>;

    fn href(&self) -> Option<String> {
        self.attribute("href")
    }

    /// Whether the router already attached its click listener.
    fn is_wired(&self) -> bool;

    fn mark_wired(&self);

    fn add_click_listener(&self, listener: ClickListener);
}

/// A click dispatched to a link element.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    pub ctrl_key: bool,
    pub meta_key: bool,
    /// Tag name of the element that was clicked.
    pub target_tag: String,
    default_prevented: Cell<bool>,
}

impl ClickEvent {
    pub fn new(target_tag: impl Into<String>) -> Self {
        Self {
            target_tag: target_tag.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    /// True when a modifier asks the browser to open the link elsewhere.
    pub fn opens_new_context(&self) -> bool {
        (self.ctrl_key || self.meta_key) && self.target_tag.eq_ignore_ascii_case("a")
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_only_counts_on_anchor() {
        assert!(ClickEvent::new("a").with_ctrl().opens_new_context());
        assert!(ClickEvent::new("A").with_meta().opens_new_context());
        assert!(!ClickEvent::new("span").with_ctrl().opens_new_context());
        assert!(!ClickEvent::new("a").opens_new_context());
    }

    #[test]
    fn test_history_mode_serde() {
        let mode: HistoryMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, HistoryMode::Replace);
        assert_eq!(serde_json::to_string(&HistoryMode::Push).unwrap(), "\"push\"");
    }
}
