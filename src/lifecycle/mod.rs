//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (harness.rs):
//!     Load TLS → Bind ephemeral port → Build handler table → Spawn server
//!
//! Per scenario (harness.rs):
//!     Reset tracker → Re-point log sink … run … → Flush log sink
//!
//! Shutdown (harness.rs, shutdown.rs):
//!     Trigger → Stop accepting → Drain → Join server task (bounded)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup or close error is fatal to the run
//! - The server task is joined explicitly; its result is the close result

pub mod harness;
pub mod shutdown;
pub mod signals;

pub use harness::{Harness, HarnessError};
pub use shutdown::{Shutdown, ShutdownListener};
