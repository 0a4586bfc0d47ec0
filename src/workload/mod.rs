//! Workload subsystem: payload generation, verification and accounting.
//!
//! # Data Flow
//! ```text
//! /prdata       → generator.rs (chunk stream, never materialised)
//! /uploadhandler → verifier.rs (streaming compare) → tracker.rs (atomic count)
//! /data         → dataset.rs (fixed random payload loaded by the driving test)
//! ```
//!
//! # Design Decisions
//! - The byte sequence is a pure function of its length; both peers recompute it
//! - Uploads are verified chunk by chunk so large bodies are never buffered
//! - The tracker is an owned handle injected into the handlers, not a global

pub mod dataset;
pub mod generator;
pub mod tracker;
pub mod verifier;

pub use dataset::{DataManager, DatasetSize};
pub use generator::{generate, Sequence};
pub use tracker::UploadTracker;
pub use verifier::{Mismatch, SequenceVerifier};
