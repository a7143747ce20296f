//! Route table, resolution and navigation.
//!
//! # Responsibilities
//! - Store routes in registration order, plus default and not-found fallbacks
//! - Resolve a location against the table and dispatch through the hooks
//! - Write history entries on navigation and resolve on back/forward
//! - Wire marked links for client-side navigation
//!
//! # Design Decisions
//! - All state lives in one `Router`; clones share it, `Router::new` never does
//! - No borrow of the state is held while user code runs, so handlers and
//!   hooks may call back into the router
//! - First match wins; absence of a match is an outcome, not an error

use std::cell::RefCell;
use std::cmp::Reverse;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RouterConfig;
use crate::platform::{ClickEvent, HistoryMode, LinkElement, ListenerId, Platform};
use crate::routing::hooks::{self, Hooks};
use crate::routing::pattern::{encode_uri, Pattern};
use crate::routing::route::{
    Fallback, Handler, HandlerArgs, ResolvedRoute, Resolution, Route, RouteMatch, RouteSpec,
};

static DUPLICATE_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])/{2,}").expect("static regex"));

struct RouterState {
    root: Option<String>,
    routes: Vec<Route>,
    default_handler: Option<Fallback>,
    not_found_handler: Option<Fallback>,
    generic_hooks: Option<Hooks>,
    paused: bool,
    destroyed: bool,
    history_mode: HistoryMode,
    last_resolved: Option<ResolvedRoute>,
    listener: Option<ListenerId>,
}

struct Inner {
    platform: Rc<dyn Platform>,
    link_attribute: String,
    state: RefCell<RouterState>,
}

/// Client-side router.
///
/// Cloning yields another handle to the same router. Use
/// [`Router::downgrade`] inside handlers that need to call back into the
/// router, so the route table does not keep itself alive.
#[derive(Clone)]
pub struct Router {
    inner: Rc<Inner>,
}

/// Non-owning handle to a [`Router`].
#[derive(Clone)]
pub struct WeakRouter {
    inner: Weak<Inner>,
}

impl WeakRouter {
    pub fn upgrade(&self) -> Option<Router> {
        self.inner.upgrade().map(|inner| Router { inner })
    }
}

impl Router {
    /// Router with default configuration; the root is derived on first use.
    pub fn new(platform: Rc<dyn Platform>) -> Self {
        Self::with_config(platform, &RouterConfig::default())
    }

    /// Router whose routes are relative to `root`.
    pub fn with_root(platform: Rc<dyn Platform>, root: &str) -> Self {
        let config = RouterConfig {
            root: Some(root.to_string()),
            ..RouterConfig::default()
        };
        Self::with_config(platform, &config)
    }

    /// Router from configuration. Starts listening for history changes and
    /// wires the links already present.
    pub fn with_config(platform: Rc<dyn Platform>, config: &RouterConfig) -> Self {
        let root = config
            .root
            .as_deref()
            .map(|r| r.strip_suffix('/').unwrap_or(r).to_string());

        let router = Self {
            inner: Rc::new(Inner {
                platform,
                link_attribute: config.link_attribute.clone(),
                state: RefCell::new(RouterState {
                    root,
                    routes: Vec::new(),
                    default_handler: None,
                    not_found_handler: None,
                    generic_hooks: None,
                    paused: false,
                    destroyed: false,
                    history_mode: config.history,
                    last_resolved: None,
                    listener: None,
                }),
            }),
        };

        router.listen();
        router.update_page_links();
        router
    }

    pub fn downgrade(&self) -> WeakRouter {
        WeakRouter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // --- registration -----------------------------------------------------

    /// Register `handler` for `pattern`. The root pattern `/` registers the
    /// default handler instead.
    pub fn on(&self, pattern: impl Into<Pattern>, handler: impl Into<Handler>) -> &Self {
        self.on_route(RouteSpec::new(pattern, handler))
    }

    /// Register a route with optional name and hooks.
    pub fn on_route(&self, spec: RouteSpec) -> &Self {
        if spec.pattern.is_root() {
            return self.on_default(spec.handler, spec.hooks);
        }
        self.add(spec);
        self
    }

    /// Register several routes at once, deepest paths first so a shallow
    /// route never shadows a deeper one. Equal depths keep their order.
    pub fn on_many<I, P, H>(&self, routes: I) -> &Self
    where
        I: IntoIterator<Item = (P, H)>,
        P: Into<Pattern>,
        H: Into<Handler>,
    {
        let mut routes: Vec<(Pattern, Handler)> = routes
            .into_iter()
            .map(|(p, h)| (p.into(), h.into()))
            .collect();
        routes.sort_by_key(|(p, _)| Reverse(p.depth()));
        for (pattern, handler) in routes {
            self.on(pattern, handler);
        }
        self
    }

    /// Handler for the bare root path when no route matched it.
    pub fn on_default(&self, handler: impl Into<Handler>, hooks: Option<Hooks>) -> &Self {
        tracing::debug!("default handler registered");
        self.inner.state.borrow_mut().default_handler = Some(Fallback {
            handler: handler.into(),
            hooks,
        });
        self
    }

    /// Handler for locations nothing else matched.
    pub fn not_found(&self, handler: impl Into<Handler>, hooks: Option<Hooks>) -> &Self {
        tracing::debug!("not-found handler registered");
        self.inner.state.borrow_mut().not_found_handler = Some(Fallback {
            handler: handler.into(),
            hooks,
        });
        self
    }

    /// Remove every route using `handler`, and the fallbacks if they use it.
    pub fn off(&self, handler: &Handler) -> &Self {
        let mut state = self.inner.state.borrow_mut();
        if state.default_handler.as_ref().is_some_and(|f| f.handler == *handler) {
            state.default_handler = None;
        }
        if state.not_found_handler.as_ref().is_some_and(|f| f.handler == *handler) {
            state.not_found_handler = None;
        }
        let before = state.routes.len();
        state.routes.retain(|r| r.handler != *handler);
        tracing::debug!(removed = before - state.routes.len(), "routes removed");
        self
    }

    /// Hooks wrapped around every resolution, outside the per-route hooks.
    pub fn hooks(&self, hooks: Hooks) -> &Self {
        self.inner.state.borrow_mut().generic_hooks = Some(hooks);
        self
    }

    fn add(&self, spec: RouteSpec) {
        let pattern = match spec.pattern {
            Pattern::Template(t) => Pattern::Template(encode_uri(&t)),
            expression => expression,
        };
        let compiled = match pattern.compile() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "route pattern does not compile and will never match");
                None
            }
        };
        tracing::debug!(pattern = pattern.source(), name = ?spec.name, "route registered");

        self.inner.state.borrow_mut().routes.push(Route {
            pattern,
            compiled,
            handler: spec.handler,
            name: spec.name,
            hooks: spec.hooks,
        });
    }

    // --- resolution -------------------------------------------------------

    /// Resolve `location` (the current location when `None`) and dispatch.
    pub fn resolve(&self, location: Option<&str>) -> Resolution {
        let location = match location {
            Some(l) => l.to_string(),
            None => self.current_location(),
        };
        let root = self.root();
        let relative = if root.is_empty() {
            location.clone()
        } else {
            location.replacen(&root, "", 1)
        };
        let query = query_part(&location).to_string();
        let url = path_part(&relative).to_string();

        if self.is_paused() {
            tracing::debug!(url = %url, "router paused, resolution skipped");
            return Resolution::NoMatch;
        }

        let found = {
            let state = self.inner.state.borrow();
            state.routes.iter().find_map(|route| {
                let m = route.compiled.as_ref()?.matches(&url)?;
                Some((route.clone(), m))
            })
        };

        if let Some((route, m)) = found {
            self.call_leave();

            let route_match = RouteMatch {
                url: url.clone(),
                query: query.clone(),
                pattern: route.pattern.source().to_string(),
                name: route.name.clone(),
                params: m.params.clone(),
                captures: m.captures.clone(),
            };

            let generic = {
                let mut state = self.inner.state.borrow_mut();
                state.last_resolved = Some(ResolvedRoute {
                    url,
                    query: query.clone(),
                    params: m.params.clone(),
                    name: route.name.clone(),
                    hooks: route.hooks.clone(),
                });
                state.generic_hooks.clone()
            };
            tracing::debug!(pattern = %route_match.pattern, url = %route_match.url, "route matched");

            let expression = route.pattern.is_expression();
            let handler = route.handler;
            let params = m.params.clone();
            let captures = m.captures;
            hooks::run_nested(
                generic,
                route.hooks,
                m.params,
                Box::new(move || {
                    if expression {
                        handler.call(HandlerArgs::Captures(&captures));
                    } else {
                        handler.call(HandlerArgs::Params {
                            params: params.as_ref(),
                            query: &query,
                        });
                    }
                }),
            );
            return Resolution::Matched(route_match);
        }

        let (fallback, generic) = {
            let state = self.inner.state.borrow();
            let fallback = if url.is_empty() || url == "/" {
                state
                    .default_handler
                    .clone()
                    .or_else(|| state.not_found_handler.clone())
            } else {
                state.not_found_handler.clone()
            };
            (fallback, state.generic_hooks.clone())
        };

        let Some(fallback) = fallback else {
            tracing::debug!(url = %url, "no route matched");
            return Resolution::NoMatch;
        };
        tracing::debug!(url = %url, "dispatching fallback handler");

        let weak = self.downgrade();
        let hooks = fallback.hooks.clone();
        hooks::run_nested(
            generic,
            fallback.hooks,
            None,
            Box::new(move || {
                if let Some(router) = weak.upgrade() {
                    router.call_leave();
                    router.inner.state.borrow_mut().last_resolved = Some(ResolvedRoute {
                        url,
                        query: query.clone(),
                        params: None,
                        name: None,
                        hooks,
                    });
                }
                fallback.handler.call(HandlerArgs::Query(&query));
            }),
        );
        Resolution::Fallback
    }

    fn call_leave(&self) {
        let leave = {
            let state = self.inner.state.borrow();
            state.last_resolved.as_ref().and_then(|last| {
                let hook = last.hooks.as_ref()?.leave_hook()?;
                Some((hook, last.params.clone()))
            })
        };
        if let Some((leave, params)) = leave {
            tracing::trace!("running leave hook");
            leave(params.as_ref());
        }
    }

    // --- navigation -------------------------------------------------------

    /// Navigate to `path` relative to the root: write a history entry, then resolve.
    pub fn navigate(&self, path: &str) -> Resolution {
        self.navigate_to(path, false)
    }

    /// Navigate to `url` as given, without the root prefix.
    pub fn navigate_absolute(&self, url: &str) -> Resolution {
        self.navigate_to(url, true)
    }

    fn navigate_to(&self, path: &str, absolute: bool) -> Resolution {
        let path = collapse_leading(path);
        let to = if absolute {
            path
        } else {
            format!("{}/{}", self.root(), path)
        };
        let to = DUPLICATE_SLASHES.replace_all(&to, "$1/").into_owned();

        let mode = self.history_mode();
        tracing::debug!(to = %to, mode = ?mode, "navigating");
        match mode {
            HistoryMode::Push => self.inner.platform.push_state(&to),
            HistoryMode::Replace => self.inner.platform.replace_state(&to),
        }
        self.resolve(None)
    }

    /// Pause (`true`) or resume (`false`). While paused, navigation replaces
    /// the current history entry and resolution does nothing.
    pub fn pause(&self, status: bool) {
        let mut state = self.inner.state.borrow_mut();
        state.paused = status;
        state.history_mode = if status {
            HistoryMode::Replace
        } else {
            HistoryMode::Push
        };
    }

    pub fn resume(&self) {
        self.pause(false);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.borrow().paused
    }

    pub fn history_mode(&self) -> HistoryMode {
        self.inner.state.borrow().history_mode
    }

    pub fn set_history_mode(&self, mode: HistoryMode) {
        self.inner.state.borrow_mut().history_mode = mode;
    }

    /// Root-prefixed URL for `path`, for display.
    pub fn link(&self, path: &str) -> String {
        format!("{}{}", self.root(), path)
    }

    /// Build a path from the route registered as `name`, substituting each
    /// `:key` with its value. Empty when no route has that name.
    pub fn generate<I, K, V>(&self, name: &str, data: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let state = self.inner.state.borrow();
        let Some(route) = state
            .routes
            .iter()
            .rev()
            .find(|r| r.name.as_deref() == Some(name))
        else {
            return String::new();
        };

        let mut result = route.pattern.source().to_string();
        for (key, value) in data {
            result = result.replacen(&format!(":{}", key.as_ref()), value.as_ref(), 1);
        }
        result
    }

    pub fn last_route_resolved(&self) -> Option<ResolvedRoute> {
        self.inner.state.borrow().last_resolved.clone()
    }

    /// The root prefix, derived and cached on first use if not configured.
    pub fn root(&self) -> String {
        if let Some(root) = &self.inner.state.borrow().root {
            return root.clone();
        }

        let location = self.current_location();
        let url = path_part(&location);
        let (origin, path) = split_origin(url);
        let root = {
            let state = self.inner.state.borrow();
            state
                .routes
                .iter()
                .map(|route| match route.pattern.source() {
                    "" | "*" => url,
                    _ => route
                        .compiled
                        .as_ref()
                        .and_then(|c| c.root_prefix(path))
                        .map(|prefix| &url[..origin.len() + prefix.len()])
                        .unwrap_or(url),
                })
                .reduce(|shortest, candidate| {
                    if shortest.len() > candidate.len() {
                        candidate
                    } else {
                        shortest
                    }
                })
                .unwrap_or(url)
                .to_string()
        };

        tracing::debug!(root = %root, "root derived");
        self.inner.state.borrow_mut().root = Some(root.clone());
        root
    }

    fn current_location(&self) -> String {
        let location = self.inner.platform.current_location();
        location.trim_end_matches('/').to_string()
    }

    // --- lifecycle --------------------------------------------------------

    fn listen(&self) {
        let weak = self.downgrade();
        let id = self.inner.platform.listen(Rc::new(move || {
            if let Some(router) = weak.upgrade() {
                router.resolve(None);
            }
        }));
        self.inner.state.borrow_mut().listener = Some(id);
    }

    /// Wire every marked link that is not wired yet. Safe to call repeatedly.
    pub fn update_page_links(&self) {
        for link in self.inner.platform.find_links(&self.inner.link_attribute) {
            if link.is_wired() {
                continue;
            }
            let router = self.downgrade();
            let element = Rc::downgrade(&link);
            link.add_click_listener(Rc::new(move |event: &ClickEvent| {
                on_link_click(&router, &element, event);
            }));
            link.mark_wired();
        }
    }

    /// Stop listening and drop the route table. Irreversible.
    pub fn destroy(&self) {
        let listener = {
            let mut state = self.inner.state.borrow_mut();
            state.routes.clear();
            state.destroyed = true;
            state.last_resolved = None;
            state.generic_hooks = None;
            state.listener.take()
        };
        if let Some(id) = listener {
            self.inner.platform.unlisten(id);
        }
        tracing::info!("router destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().destroyed
    }

    /// Destroy the router when the host has no history API.
    pub fn disable_if_api_not_available(&self) {
        if !self.inner.platform.supports_history() {
            tracing::warn!("history API not available, disabling router");
            self.destroy();
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Router")
            .field("root", &state.root)
            .field("routes", &state.routes.len())
            .field("paused", &state.paused)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

fn on_link_click(router: &WeakRouter, element: &Weak<dyn LinkElement>, event: &ClickEvent) {
    if event.opens_new_context() {
        return;
    }
    let (Some(router), Some(element)) = (router.upgrade(), element.upgrade()) else {
        return;
    };
    if router.is_destroyed() {
        tracing::warn!("link clicked after router was destroyed");
        return;
    }

    let href = element.href().unwrap_or_default();
    event.prevent_default();
    router.navigate(&collapse_leading(href.trim_end_matches('/')));
}

fn collapse_leading(path: &str) -> String {
    if path.starts_with('/') {
        format!("/{}", path.trim_start_matches('/'))
    } else {
        path.to_string()
    }
}

/// Everything after the first `?`.
fn query_part(location: &str) -> &str {
    location.split_once('?').map(|(_, q)| q).unwrap_or("")
}

/// Everything before the first `?`.
fn path_part(location: &str) -> &str {
    location.split_once('?').map(|(p, _)| p).unwrap_or(location)
}

/// Split an absolute URL into scheme plus authority and the path after it.
/// Anything that does not parse as a hierarchical URL is all path.
fn split_origin(location: &str) -> (&str, &str) {
    let hierarchical = url::Url::parse(location).is_ok_and(|parsed| !parsed.cannot_be_a_base());
    let Some(authority) = location.find("://").filter(|_| hierarchical).map(|i| i + 3) else {
        return ("", location);
    };
    let end = location[authority..]
        .find('/')
        .map_or(location.len(), |offset| authority + offset);
    location.split_at(end)
}
