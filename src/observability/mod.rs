//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / pages / config
//!     → tracing events (registration, navigation, resolution outcome)
//!     → logging.rs subscriber (installed by the binary only)
//!     → stderr, pretty or JSON
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the host's call
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
