//! Client-side navigation router.
//!
//! Maps URL paths to handlers, extracts path parameters, keeps the history
//! stack in step with navigation, and runs before/after/leave hooks around
//! every transition. The host supplies location, history and link elements
//! through [`platform::Platform`].

pub mod config;
pub mod observability;
pub mod pages;
pub mod platform;
pub mod routing;

pub use config::RouterConfig;
pub use pages::PageRegistry;
pub use platform::{HistoryMode, Platform};
pub use routing::{Handler, HandlerArgs, Hooks, Next, Params, Pattern, Resolution, RouteSpec, Router};
