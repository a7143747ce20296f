//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     on / on_route / on_many / on_default / not_found
//!     → pattern.rs (compile template or take expression as-is)
//!     → route table (ordered, first match wins)
//!
//! Resolution (navigate, back/forward, explicit resolve):
//!     location
//!     → strip root, split off raw query
//!     → router.rs (first matching route, else default / not-found)
//!     → leave hook of the previous route
//!     → hooks.rs (generic before → route before → handler → route after → generic after)
//! ```
//!
//! # Design Decisions
//! - One state struct per router instance, no globals
//! - Single-threaded (`Rc` / `RefCell`); hooks may resume later on the same thread
//! - A pattern that fails to compile is kept but never matches

pub mod hooks;
pub mod pattern;
pub mod route;
pub mod router;

pub use hooks::{Hooks, Next};
pub use pattern::{CompiledPattern, Params, Pattern, PatternError, PatternMatch};
pub use route::{Handler, HandlerArgs, ResolvedRoute, Resolution, RouteMatch, RouteSpec};
pub use router::{Router, WeakRouter};
