//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and lifecycle produce:
//!     → logging.rs (tracing events → stderr + per-scenario log file)
//!     → metrics.rs (counters, histograms → optional Prometheus endpoint)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::LogSink;
