//! Route table entries and resolution results.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::routing::hooks::Hooks;
use crate::routing::pattern::{CompiledPattern, Params, Pattern};

/// Arguments a handler is invoked with.
#[derive(Debug, Clone, Copy)]
pub enum HandlerArgs<'a> {
    /// Templated route: named parameters (if any were declared) and the raw query string.
    Params {
        params: Option<&'a Params>,
        query: &'a str,
    },
    /// Expression route: capture groups in order.
    Captures(&'a [Option<String>]),
    /// Default or not-found handler: the raw query string only.
    Query(&'a str),
}

impl<'a> HandlerArgs<'a> {
    pub fn params(&self) -> Option<&'a Params> {
        match *self {
            HandlerArgs::Params { params, .. } => params,
            _ => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params()?.get(name).map(String::as_str)
    }

    pub fn query(&self) -> Option<&'a str> {
        match *self {
            HandlerArgs::Params { query, .. } | HandlerArgs::Query(query) => Some(query),
            HandlerArgs::Captures(_) => None,
        }
    }

    pub fn captures(&self) -> &'a [Option<String>] {
        match *self {
            HandlerArgs::Captures(c) => c,
            _ => &[],
        }
    }
}

/// A route handler.
///
/// Handlers compare by identity: two clones of the same `Handler` are equal,
/// two handlers built from identical closures are not. [`Router::off`]
/// relies on this.
///
/// [`Router::off`]: crate::routing::Router::off
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(HandlerArgs<'_>)>);

impl Handler {
    pub fn new(f: impl Fn(HandlerArgs<'_>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Handler for templated routes. For the default and not-found
    /// fallbacks `params` is `None`.
    pub fn with_params(f: impl Fn(Option<&Params>, &str) + 'static) -> Self {
        Self::new(move |args| f(args.params(), args.query().unwrap_or_default()))
    }

    /// Handler for expression routes.
    pub fn with_captures(f: impl Fn(&[Option<String>]) + 'static) -> Self {
        Self::new(move |args| f(args.captures()))
    }

    pub(crate) fn call(&self, args: HandlerArgs<'_>) {
        (self.0)(args)
    }
}

impl<F> From<F> for Handler
where
    F: Fn(HandlerArgs<'_>) + 'static,
{
    fn from(f: F) -> Self {
        Handler::new(f)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Registration of a single route: pattern, handler, optional name and hooks.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub(crate) pattern: Pattern,
    pub(crate) handler: Handler,
    pub(crate) name: Option<String>,
    pub(crate) hooks: Option<Hooks>,
}

impl RouteSpec {
    pub fn new(pattern: impl Into<Pattern>, handler: impl Into<Handler>) -> Self {
        Self {
            pattern: pattern.into(),
            handler: handler.into(),
            name: None,
            hooks: None,
        }
    }

    /// Name used by [`Router::generate`](crate::routing::Router::generate).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

/// A route in the table.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub pattern: Pattern,
    /// `None` when the pattern failed to compile; such a route never matches.
    pub compiled: Option<CompiledPattern>,
    pub handler: Handler,
    pub name: Option<String>,
    pub hooks: Option<Hooks>,
}

/// A fallback handler (default or not-found) with its own hooks.
#[derive(Debug, Clone)]
pub(crate) struct Fallback {
    pub handler: Handler,
    pub hooks: Option<Hooks>,
}

/// Descriptor of the route that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    /// Root-relative path without query.
    pub url: String,
    pub query: String,
    pub pattern: String,
    pub name: Option<String>,
    pub params: Option<Params>,
    pub captures: Vec<Option<String>>,
}

/// Snapshot of the most recently resolved route.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRoute {
    pub url: String,
    pub query: String,
    pub params: Option<Params>,
    pub name: Option<String>,
    #[serde(skip)]
    pub hooks: Option<Hooks>,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A route in the table matched.
    Matched(RouteMatch),
    /// The default or not-found handler was dispatched.
    Fallback,
    /// Nothing was invoked.
    NoMatch,
}

impl Resolution {
    /// False when nothing happened.
    pub fn is_handled(&self) -> bool {
        !matches!(self, Resolution::NoMatch)
    }

    pub fn route(&self) -> Option<&RouteMatch> {
        match self {
            Resolution::Matched(m) => Some(m),
            _ => None,
        }
    }
}
