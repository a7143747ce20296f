//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated)
//!     → Router::with_config / CLI route table
//! ```
//!
//! # Design Decisions
//! - Every section has defaults, an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Route handlers are code, only the route table shape lives in config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{LogFormat, ObservabilityConfig, RouteConfig, RouterConfig};
pub use validation::{validate_config, ValidationError};
