//! Deterministic workload generator and transfer-verification harness.
//!
//! Serves a fixed set of HTTP handlers whose payloads are derived from a
//! Lehmer sequence, so a driving test can check byte-exact delivery of
//! uploads and downloads without shipping the expected bytes around.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use transfer_harness::{Harness, HarnessConfig};
//!
//! let harness = Harness::start(HarnessConfig::default()).await?;
//! harness.begin_scenario()?;
//! // drive traffic against harness.url("/uploadtest?len=1024&num=3") ...
//! harness.end_scenario()?;
//! harness.close().await?;
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod workload;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::HarnessConfig;
pub use http::build_handlers;
pub use lifecycle::{Harness, HarnessError};
pub use workload::{generate, DataManager, DatasetSize, UploadTracker};
