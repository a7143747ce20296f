//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the root is usable as a prefix
//! - Check route names are unique and templates compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: RouterConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::RouterConfig;
use crate::routing::pattern::Pattern;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("root `{0}` must be an absolute URL or start with `/`")]
    InvalidRoot(String),

    #[error("link_attribute must not be empty")]
    EmptyLinkAttribute,

    #[error("route #{0} has an empty path")]
    EmptyRoutePath(usize),

    #[error("route name `{0}` is used more than once")]
    DuplicateRouteName(String),

    #[error("route `{path}` does not compile: {reason}")]
    InvalidRoutePattern { path: String, reason: String },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(root) = &config.root {
        if !root.starts_with('/') && Url::parse(root).is_err() {
            errors.push(ValidationError::InvalidRoot(root.clone()));
        }
    }

    if config.link_attribute.trim().is_empty() {
        errors.push(ValidationError::EmptyLinkAttribute);
    }

    let mut names = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyRoutePath(i));
            continue;
        }
        if let Some(name) = &route.name {
            if !names.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateRouteName(name.clone()));
            }
        }
        if let Err(e) = Pattern::from(route.path.as_str()).compile() {
            errors.push(ValidationError::InvalidRoutePattern {
                path: route.path.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(path: &str, name: Option<&str>) -> RouteConfig {
        RouteConfig {
            path: path.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_root_forms() {
        let mut config = RouterConfig::default();
        for ok in ["http://localhost:8080", "/app", "file:///tmp/index.html"] {
            config.root = Some(ok.to_string());
            assert!(validate_config(&config).is_ok(), "{ok}");
        }
        config.root = Some("app".to_string());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidRoot("app".to_string())]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let config = RouterConfig {
            link_attribute: " ".to_string(),
            routes: vec![
                route("/a", Some("a")),
                route("", None),
                route("/b", Some("a")),
            ],
            ..RouterConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyLinkAttribute,
                ValidationError::EmptyRoutePath(1),
                ValidationError::DuplicateRouteName("a".to_string()),
            ]
        );
    }
}
