//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::platform::HistoryMode;

/// Root configuration for a router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Base prefix all routes are relative to (e.g. `http://host/app`).
    /// Derived from the location and route table when absent.
    pub root: Option<String>,

    /// Attribute marking links that navigate client-side.
    pub link_attribute: String,

    /// Initial history update method.
    pub history: HistoryMode,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, used by the CLI.
    pub routes: Vec<RouteConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            root: None,
            link_attribute: "app-route".to_string(),
            history: HistoryMode::Push,
            observability: ObservabilityConfig::default(),
            routes: Vec::new(),
        }
    }
}

/// A route table entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path template, e.g. `/queue/:id`.
    pub path: String,

    /// Name for reverse generation.
    #[serde(default)]
    pub name: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
