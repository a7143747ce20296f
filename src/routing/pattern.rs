//! Route pattern compilation.
//!
//! # Responsibilities
//! - Turn a path template (`/users/:id/*`) into a matching expression
//! - Record parameter names in order of appearance
//! - Pass caller-supplied expressions through unchanged
//! - Extract percent-decoded parameters from a match
//!
//! # Design Decisions
//! - `:name` matches one segment, `*` and `*name` match the rest of the path
//! - A template is start-anchored only when it begins with `/`
//! - Every compiled template accepts an optional trailing `/`
//! - Zero declared parameters yields `None`, not an empty map

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Named parameters extracted from a templated route.
pub type Params = BTreeMap<String, String>;

/// Error produced when a pattern cannot be turned into a matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A route pattern as supplied by the caller.
#[derive(Clone)]
pub enum Pattern {
    /// Path template with fixed segments, `:name` parameters and wildcards.
    Template(String),
    /// Precompiled expression; captures are handed to the handler positionally.
    Expression(Regex),
}

impl Pattern {
    /// Template text or expression source.
    pub fn source(&self) -> &str {
        match self {
            Pattern::Template(t) => t,
            Pattern::Expression(re) => re.as_str(),
        }
    }

    /// True for the bare root template, which registers the default handler.
    pub fn is_root(&self) -> bool {
        matches!(self, Pattern::Template(t) if t == "/")
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Pattern::Expression(_))
    }

    /// Number of `/`-separated pieces, ignoring one trailing separator.
    pub fn depth(&self) -> usize {
        url_depth(self.source())
    }

    /// Compile into a matcher.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        match self {
            Pattern::Expression(re) => Ok(CompiledPattern {
                regex: re.clone(),
                groups: Vec::new(),
                finder: Regex::new(&format!("(?:{})(?:$|/)", re.as_str())).ok(),
            }),
            Pattern::Template(template) => compile_template(template),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Pattern::Expression(re) => f.debug_tuple("Expression").field(&re.as_str()).finish(),
        }
    }
}

impl From<&str> for Pattern {
    fn from(template: &str) -> Self {
        Pattern::Template(template.to_string())
    }
}

impl From<String> for Pattern {
    fn from(template: String) -> Self {
        Pattern::Template(template)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Expression(re)
    }
}

/// Result of matching a path against a compiled pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub params: Option<Params>,
    pub captures: Vec<Option<String>>,
}

/// A pattern ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    /// One entry per capture group the template emitted; `None` for bare wildcards.
    groups: Vec<Option<String>>,
    /// Unanchored variant used to derive the root prefix from a location.
    finder: Option<Regex>,
}

impl CompiledPattern {
    /// Parameter names in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().filter_map(|g| g.as_deref())
    }

    /// Match a root-relative path. Leading separators are collapsed first.
    pub fn matches(&self, path: &str) -> Option<PatternMatch> {
        let path = collapse_leading_slashes(path);
        let caps = self.regex.captures(&path)?;

        let captures: Vec<Option<String>> = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();

        let params = if self.groups.iter().all(Option::is_none) {
            None
        } else {
            let mut params = Params::new();
            for (name, value) in self.groups.iter().zip(&captures) {
                if let (Some(name), Some(value)) = (name, value) {
                    params.insert(name.clone(), decode_component(value));
                }
            }
            Some(params)
        };

        Some(PatternMatch { params, captures })
    }

    /// The part of `url` preceding this pattern's first match, if it matches at all.
    pub fn root_prefix<'a>(&self, url: &'a str) -> Option<&'a str> {
        let found = self.finder.as_ref()?.find(url)?;
        Some(&url[..found.start()])
    }
}

fn compile_template(template: &str) -> Result<CompiledPattern, PatternError> {
    let trimmed = template.trim_end_matches('/');
    let (anchor, rest) = match trimmed.strip_prefix('/') {
        Some(_) => ("^/", trimmed.trim_start_matches('/')),
        None => ("", trimmed),
    };

    let mut body = String::from(anchor);
    let mut groups = Vec::new();
    let mut chars = rest.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c != ':' && c != '*' {
            literal.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(&n) = chars.peek() {
            if n.is_ascii_alphanumeric() || n == '_' {
                name.push(n);
                chars.next();
            } else {
                break;
            }
        }

        if name.is_empty() && c == ':' {
            literal.push(c);
            continue;
        }

        body.push_str(&regex::escape(&literal));
        literal.clear();

        if c == ':' {
            body.push_str("([^/]+)");
        } else {
            body.push_str("(.*)");
        }
        groups.push((!name.is_empty()).then_some(name));
    }
    body.push_str(&regex::escape(&literal));

    let regex = Regex::new(&format!("{body}(?:/$|$)")).map_err(|source| PatternError::Invalid {
        pattern: template.to_string(),
        source,
    })?;
    let finder = Regex::new(&format!("{}(?:$|/)", body.trim_start_matches('^'))).ok();

    Ok(CompiledPattern {
        regex,
        groups,
        finder,
    })
}

/// Depth of a path: pieces separated by `/`, after dropping one trailing `/`.
pub fn url_depth(url: &str) -> usize {
    url.strip_suffix('/').unwrap_or(url).split('/').count()
}

/// Replace any run of leading `/` with a single one.
pub(crate) fn collapse_leading_slashes(path: &str) -> Cow<'_, str> {
    if path.starts_with("//") {
        Cow::Owned(format!("/{}", path.trim_start_matches('/')))
    } else {
        Cow::Borrowed(path)
    }
}

/// Percent-decode a captured value; invalid UTF-8 decodes lossily.
pub(crate) fn decode_component(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned(),
    }
}

/// Percent-encode the characters `encodeURI` would, leaving URI syntax intact.
pub(crate) fn encode_uri(template: &str) -> String {
    const KEEP: &str = ";,/?:@&=+$-_.!~*'()#";

    let mut out = String::with_capacity(template.len());
    let mut buf = [0u8; 4];
    for c in template.chars() {
        if c.is_ascii_alphanumeric() || KEEP.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}
