//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! harness.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//!     → consumed once by Harness::start
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; a bare harness needs no file at all
//! - Validation is a pure function returning every error found

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DatasetConfig, HarnessConfig, LifecycleConfig, LimitsConfig, ListenerConfig,
    ObservabilityConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
